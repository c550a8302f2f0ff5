// File: incus-backup/src/snapshot/manager.rs
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::timestamp::parse_created_at;
use crate::archive::retention_cutoff;
use crate::errors::SnapshotError;
use crate::incus::IncusClient;

/// What a successful create call actually produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Stateful,
    Stateless,
    /// Stateful was requested, the stateless fallback succeeded
    DegradedToStateless,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotPruneSummary {
    pub deleted: usize,
    pub retained: usize,
    /// Entries without a usable name or creation date
    pub skipped: usize,
    /// Deletions the control plane refused
    pub failed: usize,
}

pub struct SnapshotManager {
    client: Arc<IncusClient>,
}

impl SnapshotManager {
    pub fn new(client: Arc<IncusClient>) -> Self {
        Self { client }
    }

    /// Create `snapshot_name` for `instance`, degrading a failed stateful
    /// attempt to a single stateless retry under the same name.
    pub async fn create_snapshot(
        &self,
        instance: &str,
        snapshot_name: &str,
        stateful: bool,
    ) -> Result<SnapshotKind, SnapshotError> {
        info!(
            "Taking {}snapshot '{}' for instance '{}'",
            if stateful { "stateful " } else { "" },
            snapshot_name,
            instance
        );

        if stateful {
            match self.client.create_snapshot(instance, snapshot_name, true).await {
                Ok(()) => {
                    debug!("Stateful snapshot {} created for {}", snapshot_name, instance);
                    return Ok(SnapshotKind::Stateful);
                }
                Err(e) => {
                    warn!(
                        "Stateful snapshot of {} failed, attempting stateless: {}",
                        instance, e
                    );
                }
            }
        }

        match self.client.create_snapshot(instance, snapshot_name, false).await {
            Ok(()) => {
                debug!("Snapshot {} created for {}", snapshot_name, instance);
                Ok(if stateful {
                    SnapshotKind::DegradedToStateless
                } else {
                    SnapshotKind::Stateless
                })
            }
            Err(source) => {
                if stateful {
                    error!(
                        "Failed both stateful and stateless snapshots of {}: {}",
                        instance, source
                    );
                } else {
                    error!("Snapshot creation failed for {}: {}", instance, source);
                }
                Err(SnapshotError::CreateFailed {
                    instance: instance.to_string(),
                    snapshot: snapshot_name.to_string(),
                    source,
                })
            }
        }
    }

    pub async fn prune_snapshots(
        &self,
        instance: &str,
        retention_days: u32,
    ) -> Result<SnapshotPruneSummary, SnapshotError> {
        self.prune_snapshots_at(instance, retention_days, Utc::now())
            .await
    }

    /// Delete snapshots created strictly before `now - retention_days`.
    ///
    /// Entries that cannot be evaluated and deletions that fail are logged
    /// and counted; only a failed listing is returned as an error.
    pub async fn prune_snapshots_at(
        &self,
        instance: &str,
        retention_days: u32,
        now: DateTime<Utc>,
    ) -> Result<SnapshotPruneSummary, SnapshotError> {
        info!("Starting snapshot pruning for {}", instance);

        let snapshots = self
            .client
            .list_snapshots(instance)
            .await
            .map_err(|source| SnapshotError::List {
                instance: instance.to_string(),
                source,
            })?;

        let cutoff = retention_cutoff(now, retention_days);
        match cutoff {
            Some(cutoff) => {
                debug!("Snapshot cutoff time for {} (UTC): {}", instance, cutoff.to_rfc3339())
            }
            None => warn!(
                "Retention of {} days reaches past the earliest date; keeping all snapshots of {}",
                retention_days, instance
            ),
        }

        let mut summary = SnapshotPruneSummary::default();

        for snapshot in snapshots {
            let Some(name) = snapshot.name.filter(|n| !n.is_empty()) else {
                warn!("Snapshot without a name listed for {}; skipping", instance);
                summary.skipped += 1;
                continue;
            };

            let Some(created_str) = snapshot.created_at.filter(|c| !c.is_empty()) else {
                warn!("No creation date for snapshot '{}' in {}; skipping", name, instance);
                summary.skipped += 1;
                continue;
            };

            let created_at = match parse_created_at(&created_str) {
                Ok(created_at) => created_at,
                Err(e) => {
                    error!(
                        "Error parsing creation date for snapshot '{}' in {}: {}",
                        name, instance, e
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            if cutoff.map_or(true, |cutoff| created_at >= cutoff) {
                debug!(
                    "Keeping recent snapshot {} of {} (created {} UTC)",
                    name,
                    instance,
                    created_at.to_rfc3339()
                );
                summary.retained += 1;
                continue;
            }

            info!(
                "Deleting snapshot {} of {} (created {} UTC)",
                name,
                instance,
                created_at.to_rfc3339()
            );
            match self.client.delete_snapshot(instance, &name).await {
                Ok(()) => summary.deleted += 1,
                Err(e) => {
                    error!("Error deleting snapshot '{}' for {}: {}", name, instance, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Snapshot pruning for {} complete: {} deleted, {} retained, {} skipped, {} failed",
            instance, summary.deleted, summary.retained, summary.skipped, summary.failed
        );

        Ok(summary)
    }
}
