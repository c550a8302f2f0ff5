use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{error, info};

use crate::constants::BYTES_PER_MB;
use crate::errors::{CommandError, ExportError};
use crate::incus::IncusClient;

/// Flags passed to instance and volume exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub optimized_storage: bool,
    /// Leave attached volumes out of instance archives; they get their own
    pub instance_only: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            optimized_storage: true,
            instance_only: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportMetrics {
    pub target: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub elapsed: Duration,
    /// MB/s; infinite when the export took no measurable time
    pub throughput_mb_s: f64,
}

impl ExportMetrics {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }
}

pub fn throughput_mb_per_sec(size_bytes: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if seconds > 0.0 {
        size_bytes as f64 / BYTES_PER_MB / seconds
    } else {
        f64::INFINITY
    }
}

pub struct ExportPipeline {
    client: Arc<IncusClient>,
    options: ExportOptions,
}

impl ExportPipeline {
    pub fn new(client: Arc<IncusClient>, options: ExportOptions) -> Self {
        Self { client, options }
    }

    pub async fn export_instance(
        &self,
        instance: &str,
        destination: &Path,
    ) -> Result<ExportMetrics, ExportError> {
        let target = format!("instance {}", instance);
        info!("Exporting instance '{}' to file '{}'", instance, destination.display());

        let started = Instant::now();
        let result = self
            .client
            .export_instance(instance, destination, &self.options)
            .await;

        self.finish(target, destination, started, result).await
    }

    pub async fn export_volume(
        &self,
        storage_pool: &str,
        volume: &str,
        destination: &Path,
        project: &str,
    ) -> Result<ExportMetrics, ExportError> {
        let target = format!("volume {}/{}", storage_pool, volume);
        info!(
            "Exporting block volume '{}' (pool '{}', project '{}') to file '{}'",
            volume,
            storage_pool,
            project,
            destination.display()
        );

        let started = Instant::now();
        let result = self
            .client
            .export_volume(
                storage_pool,
                volume,
                destination,
                project,
                self.options.optimized_storage,
            )
            .await;

        self.finish(target, destination, started, result).await
    }

    /// Verify the archive really exists and report its throughput
    async fn finish(
        &self,
        target: String,
        destination: &Path,
        started: Instant,
        result: Result<(), CommandError>,
    ) -> Result<ExportMetrics, ExportError> {
        let elapsed = started.elapsed();

        if let Err(source) = result {
            error!("Error exporting {}: {}", target, source);
            return Err(ExportError::Command { target, source });
        }

        let metadata = match fs::metadata(destination).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => {
                error!(
                    "Backup file {} not found after export of {}",
                    destination.display(),
                    target
                );
                return Err(ExportError::MissingOutput {
                    target,
                    path: destination.to_path_buf(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!(
                    "Backup file {} not found after export of {}",
                    destination.display(),
                    target
                );
                return Err(ExportError::MissingOutput {
                    target,
                    path: destination.to_path_buf(),
                });
            }
            Err(source) => {
                error!("Failed to inspect {}: {}", destination.display(), source);
                return Err(ExportError::Metadata {
                    path: destination.to_path_buf(),
                    source,
                });
            }
        };

        let metrics = ExportMetrics {
            size_bytes: metadata.len(),
            throughput_mb_s: throughput_mb_per_sec(metadata.len(), elapsed),
            target,
            path: destination.to_path_buf(),
            elapsed,
        };

        info!(
            "Backup of {} completed in {:.2} seconds. Size: {:.2} MB. Speed: {:.2} MB/s",
            metrics.target,
            metrics.elapsed.as_secs_f64(),
            metrics.size_mb(),
            metrics.throughput_mb_s
        );

        Ok(metrics)
    }
}
