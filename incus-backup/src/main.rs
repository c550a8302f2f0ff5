// File: incus-backup/src/main.rs
use anyhow::{anyhow, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use incus_backup::constants::defaults;
use incus_backup::{ConfigManager, Orchestrator, RunOutcome, SystemCommandRunner};

#[derive(Parser)]
#[command(name = "incus-backup")]
#[command(about = "Snapshot, export and prune Incus instances and their block volumes", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = defaults::CONFIG_PATH)]
    config: PathBuf,

    /// Log at debug level regardless of the configuration
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_manager = match ConfigManager::new(&cli.config).await {
        Ok(manager) => manager,
        Err(e) => {
            if let Err(log_err) = init_logging(cli.debug, None) {
                eprintln!("Failed to initialize logging: {:#}", log_err);
            }
            error!("Failed to load configuration: {:#}", e);
            return ExitCode::from(2);
        }
    };
    let config = config_manager.get_current_config();

    if let Err(e) = init_logging(cli.debug || config.debug, config.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }
    info!("Configuration loaded from {}: {}", cli.config.display(), config.summary());

    let orchestrator = Orchestrator::new(config, Arc::new(SystemCommandRunner));

    match orchestrator.run().await {
        Ok(report) => match report.outcome {
            RunOutcome::Completed => {
                if report.failed_instances() > 0 {
                    warn!(
                        "{} of {} instances had failures; see errors above",
                        report.failed_instances(),
                        report.instances.len()
                    );
                }
                ExitCode::SUCCESS
            }
            RunOutcome::Aborted(reason) => {
                error!("Backup run aborted: {}", reason);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!("Backup run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Console logging, plus an append-only file when `log_file` is set
fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if debug { "debug" } else { "info" };
    let env_filter = EnvFilter::from_default_env()
        .add_directive(format!("incus_backup={}", level).parse()?);

    let mut file_error = None;
    let file_layer = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
            Err(e) => {
                file_error = Some(format!("Error setting up log file {}: {}", path.display(), e));
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    if let Some(message) = file_error {
        error!("{}", message);
    }
    info!("Logging initialized at {} level", level);

    Ok(())
}
