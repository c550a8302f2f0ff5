//! Test configuration builder backed by a temporary directory

use incus_backup::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    config: Config,
}

impl TestConfigBuilder {
    /// Config with defaults and `backup_dir` inside a fresh temp dir
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config::new(temp_dir.path().join("backups"));
        Self { temp_dir, config }
    }

    pub fn with<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Config),
    {
        f(&mut self.config);
        self
    }

    pub fn build(self) -> TestConfig {
        TestConfig {
            temp_dir: self.temp_dir,
            config: Arc::new(self.config),
        }
    }
}

/// Built test configuration; the temp dir lives as long as this value
pub struct TestConfig {
    pub temp_dir: TempDir,
    pub config: Arc<Config>,
}

impl TestConfig {
    pub fn backup_dir(&self) -> &Path {
        &self.config.backup_dir
    }

    pub fn archive_path(&self, file_name: &str) -> PathBuf {
        self.config.backup_dir.join(file_name)
    }

    /// Create the backup directory with empty files of the given names
    pub fn seed_archives(&self, file_names: &[&str]) {
        std::fs::create_dir_all(self.backup_dir()).expect("Failed to create backup dir");
        for name in file_names {
            std::fs::write(self.archive_path(name), b"archive").expect("Failed to seed archive");
        }
    }
}
