// File: incus-backup/src/config/manager.rs
use super::Config;
use crate::constants::retention::MAX_DAYS;
use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load_configuration(config_path.as_ref()).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_path: &Path) -> Result<Config> {
        debug!("Loading configuration: {}", config_path.display());

        let content = fs::read_to_string(config_path)
            .await
            .map_err(|e| anyhow!("Failed to read config {}: {}", config_path.display(), e))?;

        let config = Self::parse(&content)
            .map_err(|e| anyhow!("Invalid config {}: {}", config_path.display(), e))?;

        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn parse(content: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| anyhow!("Failed to parse config: {}", e))?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &Config) -> Result<()> {
        if config.backup_dir.as_os_str().is_empty() {
            return Err(anyhow!("Invalid value for 'backup_dir': must not be empty"));
        }

        for (field, days) in [
            ("snapshot_retention_days", config.snapshot_retention_days),
            ("archive_retention_days", config.archive_retention_days),
        ] {
            if days > MAX_DAYS {
                return Err(anyhow!(
                    "Invalid value for '{}': {} days exceeds the maximum of {}",
                    field,
                    days,
                    MAX_DAYS
                ));
            }
        }

        for (field, value) in [
            ("storage_pool", &config.storage_pool),
            ("project", &config.project),
            ("incus_binary", &config.incus_binary),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("Invalid value for '{}': must not be empty", field));
            }
        }

        Ok(())
    }
}
