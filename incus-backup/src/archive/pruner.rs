use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, error, info, warn};

use super::naming::ArchiveName;
use crate::errors::PruneError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchivePruneSummary {
    pub deleted: usize,
    pub retained: usize,
    /// `.tar.gz` files with an unreadable timestamp, plus failed deletions
    pub errors: usize,
    /// Entries that are not archives at all (other files, directories)
    pub ignored: usize,
}

/// `now - retention_days`, or `None` when that falls outside the
/// representable date range and nothing can be old enough to delete
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(retention_days)).and_then(|days| now.checked_sub_signed(days))
}

/// Deletes archives whose filename timestamp is older than the retention window
pub struct RetentionPruner {
    backup_dir: PathBuf,
    retention_days: u32,
}

impl RetentionPruner {
    pub fn new(backup_dir: impl Into<PathBuf>, retention_days: u32) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            retention_days,
        }
    }

    pub async fn prune(&self) -> Result<ArchivePruneSummary, PruneError> {
        self.prune_at(Utc::now()).await
    }

    /// Scan the backup directory once and delete archives stamped strictly
    /// before `now - retention_days`.
    ///
    /// Per-file problems are counted in the summary; the only error is a
    /// directory that cannot be listed.
    pub async fn prune_at(&self, now: DateTime<Utc>) -> Result<ArchivePruneSummary, PruneError> {
        info!(
            "Pruning backups older than {} days in {}",
            self.retention_days,
            self.backup_dir.display()
        );

        let cutoff = retention_cutoff(now, self.retention_days).map(|c| c.naive_utc());
        if cutoff.is_none() {
            warn!(
                "Retention of {} days reaches past the earliest date; keeping all archives",
                self.retention_days
            );
        }
        let read_dir_error = |source| PruneError::ReadDir {
            path: self.backup_dir.clone(),
            source,
        };

        let mut entries = fs::read_dir(&self.backup_dir).await.map_err(read_dir_error)?;
        let mut summary = ArchivePruneSummary::default();

        while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                summary.ignored += 1;
                continue;
            };

            if !ArchiveName::has_archive_suffix(&file_name) {
                summary.ignored += 1;
                continue;
            }

            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => {}
                Ok(_) => {
                    summary.ignored += 1;
                    continue;
                }
                Err(e) => {
                    error!("Error inspecting {}: {}", file_name, e);
                    summary.errors += 1;
                    continue;
                }
            }

            let Some(archive) = ArchiveName::parse(&file_name) else {
                error!("Invalid timestamp in filename {}", file_name);
                summary.errors += 1;
                continue;
            };

            if cutoff.map_or(true, |cutoff| archive.timestamp >= cutoff) {
                summary.retained += 1;
                continue;
            }

            debug!("Deleting old backup: {}", file_name);
            match fs::remove_file(entry.path()).await {
                Ok(()) => summary.deleted += 1,
                Err(e) => {
                    error!("Error deleting {}: {}", file_name, e);
                    summary.errors += 1;
                }
            }
        }

        info!(
            "Backup pruning complete. Deleted {} files, {} errors",
            summary.deleted, summary.errors
        );

        Ok(summary)
    }
}
