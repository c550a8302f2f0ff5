// File: incus-backup/src/config/mod.rs
pub mod manager;
use serde::Deserialize;
use std::path::PathBuf;

use crate::constants::{defaults, incus};
use crate::export::ExportOptions;
pub use manager::ConfigManager;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory receiving exported archives
    pub backup_dir: PathBuf,
    #[serde(default = "default_snapshot_retention_days")]
    pub snapshot_retention_days: u32,
    #[serde(default = "default_archive_retention_days")]
    pub archive_retention_days: u32,
    #[serde(default = "default_storage_pool")]
    pub storage_pool: String,
    #[serde(default = "default_project")]
    pub project: String,
    // Snapshot configuration
    #[serde(default)]
    pub stateful_snapshots: bool,
    #[serde(default = "default_true")]
    pub snapshots_enabled: bool,
    // Export configuration
    #[serde(default = "default_true")]
    pub instance_exports_enabled: bool,
    #[serde(default = "default_true")]
    pub volume_exports_enabled: bool,
    #[serde(default = "default_true")]
    pub optimized_storage: bool,
    #[serde(default = "default_true")]
    pub instance_only: bool,
    // Control plane
    #[serde(default)]
    pub instance_listing: InstanceListing,
    #[serde(default = "default_incus_binary")]
    pub incus_binary: String,
    // Logging
    #[serde(default)]
    pub debug: bool,
    pub log_file: Option<PathBuf>,
}

/// How the instance inventory is read from the control plane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceListing {
    /// `list --format json`, falling back to the table when it fails
    #[default]
    Json,
    /// Human-readable `list` table only
    Table,
}

impl Config {
    /// Configuration with every optional key at its default
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            snapshot_retention_days: default_snapshot_retention_days(),
            archive_retention_days: default_archive_retention_days(),
            storage_pool: default_storage_pool(),
            project: default_project(),
            stateful_snapshots: false,
            snapshots_enabled: true,
            instance_exports_enabled: true,
            volume_exports_enabled: true,
            optimized_storage: true,
            instance_only: true,
            instance_listing: InstanceListing::default(),
            incus_binary: default_incus_binary(),
            debug: false,
            log_file: None,
        }
    }

    /// One-line description for the startup log
    pub fn summary(&self) -> String {
        format!(
            "backup dir {}, snapshot retention {} days, archive retention {} days, pool '{}', project '{}'",
            self.backup_dir.display(),
            self.snapshot_retention_days,
            self.archive_retention_days,
            self.storage_pool,
            self.project
        )
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            optimized_storage: self.optimized_storage,
            instance_only: self.instance_only,
        }
    }
}

fn default_snapshot_retention_days() -> u32 {
    defaults::SNAPSHOT_RETENTION_DAYS
}

fn default_archive_retention_days() -> u32 {
    defaults::ARCHIVE_RETENTION_DAYS
}

fn default_storage_pool() -> String {
    defaults::STORAGE_POOL.to_string()
}

fn default_project() -> String {
    defaults::PROJECT.to_string()
}

fn default_incus_binary() -> String {
    incus::DEFAULT_BINARY.to_string()
}

fn default_true() -> bool {
    true
}
