//! One backup run, start to finish
//!
//! A run prepares the backup directory, takes the inventory once, processes
//! every instance in turn and finally prunes old archives. Failures inside an
//! instance are recorded in its [`InstanceReport`] and never stop the run;
//! only an unusable backup directory or an empty inventory does.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

use crate::archive::{ArchiveName, ArchivePruneSummary, RetentionPruner};
use crate::config::Config;
use crate::constants::{archive::TIMESTAMP_FORMAT, snapshot::NAME_PREFIX};
use crate::discovery::{InstanceDiscovery, VolumeDiscovery, VolumeMap};
use crate::errors::{BackupError, ExportError, SnapshotError};
use crate::export::{ExportMetrics, ExportPipeline};
use crate::incus::{CommandRunner, IncusClient};
use crate::snapshot::{SnapshotKind, SnapshotManager, SnapshotPruneSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    DirectoryReady,
    Discovered,
    PerInstanceProcessing,
    GlobalPruning,
    Done,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Aborted(String),
}

/// Why part of an instance's sub-sequence did not succeed
#[derive(Debug)]
pub enum InstanceFailure {
    SnapshotPrune(SnapshotError),
    /// Exports were skipped for this instance
    SnapshotCreate(SnapshotError),
    InstanceExport(ExportError),
    VolumeExport { volume: String, error: ExportError },
}

#[derive(Debug)]
pub struct InstanceReport {
    pub instance: String,
    pub snapshots_pruned: Option<SnapshotPruneSummary>,
    pub snapshot: Option<SnapshotKind>,
    pub archives: Vec<ExportMetrics>,
    pub failures: Vec<InstanceFailure>,
}

impl InstanceReport {
    fn new(instance: &str) -> Self {
        Self {
            instance: instance.to_string(),
            snapshots_pruned: None,
            snapshot: None,
            archives: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn exports_skipped(&self) -> bool {
        self.failures
            .iter()
            .any(|f| matches!(f, InstanceFailure::SnapshotCreate(_)))
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub final_state: RunState,
    /// `YYYYMMDDHHMMSS`, shared by the snapshot and archive names of the run
    pub run_timestamp: String,
    pub instances: Vec<InstanceReport>,
    pub archive_prune: Option<ArchivePruneSummary>,
}

impl RunReport {
    pub fn succeeded_instances(&self) -> usize {
        self.instances.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed_instances(&self) -> usize {
        self.instances.len() - self.succeeded_instances()
    }

    pub fn report_for(&self, instance: &str) -> Option<&InstanceReport> {
        self.instances.iter().find(|r| r.instance == instance)
    }
}

pub struct Orchestrator {
    config: Arc<Config>,
    instances: InstanceDiscovery,
    volumes: VolumeDiscovery,
    snapshots: SnapshotManager,
    exports: ExportPipeline,
    pruner: RetentionPruner,
}

impl Orchestrator {
    pub fn new(config: Arc<Config>, runner: Arc<dyn CommandRunner>) -> Self {
        let client = Arc::new(IncusClient::new(runner, config.incus_binary.clone()));

        Self {
            instances: InstanceDiscovery::new(client.clone(), config.instance_listing),
            volumes: VolumeDiscovery::new(
                client.clone(),
                config.storage_pool.clone(),
                config.project.clone(),
            ),
            snapshots: SnapshotManager::new(client.clone()),
            exports: ExportPipeline::new(client, config.export_options()),
            pruner: RetentionPruner::new(config.backup_dir.clone(), config.archive_retention_days),
            config,
        }
    }

    pub async fn run(&self) -> Result<RunReport, BackupError> {
        self.run_at(Utc::now()).await
    }

    /// Execute one run as if the clock read `now`
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport, BackupError> {
        info!("Starting backup process for Incus instances");
        let mut state = RunState::Start;

        let stamp = now.trunc_subsecs(0).naive_utc();
        let run_timestamp = stamp.format(TIMESTAMP_FORMAT).to_string();
        debug!("Timestamp for backup: {}", run_timestamp);

        if let Err(e) = self.prepare_backup_dir().await {
            transition(&mut state, RunState::Aborted);
            error!("{}", e);
            return Err(e);
        }
        transition(&mut state, RunState::DirectoryReady);

        let instances = self.instances.discover().await;
        if instances.is_empty() {
            transition(&mut state, RunState::Aborted);
            let reason = "No instances found or error retrieving instance list".to_string();
            error!("{}", reason);
            return Ok(RunReport {
                outcome: RunOutcome::Aborted(reason),
                final_state: state,
                run_timestamp,
                instances: Vec::new(),
                archive_prune: None,
            });
        }

        let volumes = if self.config.volume_exports_enabled {
            self.volumes.discover().await
        } else {
            VolumeMap::new()
        };
        transition(&mut state, RunState::Discovered);

        transition(&mut state, RunState::PerInstanceProcessing);
        let mut reports = Vec::with_capacity(instances.len());
        for instance in &instances {
            let attached = volumes.get(instance).map(Vec::as_slice).unwrap_or(&[]);
            reports.push(self.process_instance(instance, attached, stamp, now).await);
        }

        transition(&mut state, RunState::GlobalPruning);
        let archive_prune = match self.pruner.prune_at(now).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!("Failed to prune backups: {}", e);
                None
            }
        };

        transition(&mut state, RunState::Done);
        let report = RunReport {
            outcome: RunOutcome::Completed,
            final_state: state,
            run_timestamp,
            instances: reports,
            archive_prune,
        };

        let (deleted, errors) = report
            .archive_prune
            .as_ref()
            .map(|s| (s.deleted, s.errors))
            .unwrap_or_default();
        info!(
            "Backup run {} finished: {} instances ok, {} with failures, {} archives deleted, {} prune errors",
            report.run_timestamp,
            report.succeeded_instances(),
            report.failed_instances(),
            deleted,
            errors
        );

        Ok(report)
    }

    async fn prepare_backup_dir(&self) -> Result<(), BackupError> {
        let path = &self.config.backup_dir;
        if fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Ok(());
        }

        debug!("Backup directory '{}' does not exist. Attempting to create it.", path.display());
        fs::create_dir_all(path)
            .await
            .map_err(|source| BackupError::Precondition {
                path: path.clone(),
                source,
            })?;
        debug!("Successfully created backup directory '{}'.", path.display());
        Ok(())
    }

    #[instrument(skip(self, volumes, stamp, now))]
    async fn process_instance(
        &self,
        instance: &str,
        volumes: &[String],
        stamp: NaiveDateTime,
        now: DateTime<Utc>,
    ) -> InstanceReport {
        info!("Processing instance: {}", instance);
        let mut report = InstanceReport::new(instance);

        if self.config.snapshots_enabled {
            match self
                .snapshots
                .prune_snapshots_at(instance, self.config.snapshot_retention_days, now)
                .await
            {
                Ok(summary) => report.snapshots_pruned = Some(summary),
                Err(e) => {
                    error!("Error during snapshot pruning for {}: {}", instance, e);
                    report.failures.push(InstanceFailure::SnapshotPrune(e));
                }
            }

            let snapshot_name = format!("{}{}", NAME_PREFIX, stamp.format(TIMESTAMP_FORMAT));
            match self
                .snapshots
                .create_snapshot(instance, &snapshot_name, self.config.stateful_snapshots)
                .await
            {
                Ok(kind) => report.snapshot = Some(kind),
                Err(e) => {
                    error!("Skipping export for {} due to error: {}", instance, e);
                    report.failures.push(InstanceFailure::SnapshotCreate(e));
                    return report;
                }
            }
        }

        if self.config.instance_exports_enabled {
            let destination = ArchiveName::for_instance(instance, stamp).path_in(&self.config.backup_dir);
            match self.exports.export_instance(instance, &destination).await {
                Ok(metrics) => report.archives.push(metrics),
                Err(e) => report.failures.push(InstanceFailure::InstanceExport(e)),
            }
        }

        if self.config.volume_exports_enabled {
            for volume in volumes {
                let destination =
                    ArchiveName::for_volume(instance, volume, stamp).path_in(&self.config.backup_dir);
                match self
                    .exports
                    .export_volume(&self.config.storage_pool, volume, &destination, &self.config.project)
                    .await
                {
                    Ok(metrics) => report.archives.push(metrics),
                    Err(error) => report.failures.push(InstanceFailure::VolumeExport {
                        volume: volume.clone(),
                        error,
                    }),
                }
            }
        }

        if report.is_success() {
            info!("Instance {} backed up: {} archives written", instance, report.archives.len());
        } else {
            warn!(
                "Instance {} finished with {} failures, {} archives written",
                instance,
                report.failures.len(),
                report.archives.len()
            );
        }

        report
    }
}

fn transition(state: &mut RunState, next: RunState) {
    debug!("Run state: {:?} -> {:?}", state, next);
    *state = next;
}
