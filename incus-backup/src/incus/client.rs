use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use super::commands::{render_command, CommandRunner};
use crate::errors::CommandError;
use crate::export::ExportOptions;

/// Entry of `incus list --format json`
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceRecord {
    pub name: String,
}

/// Entry of `incus snapshot list <instance> --format json`
///
/// Both fields are optional so that one malformed entry does not make the
/// whole listing unreadable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Entry of `incus storage volume list <pool> --all-projects --format json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageVolumeRecord {
    pub name: String,
    #[serde(default)]
    pub project: String,
    #[serde(rename = "type", default)]
    pub volume_type: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub used_by: Option<Vec<String>>,
}

/// Typed facade over the `incus` binary
pub struct IncusClient {
    runner: Arc<dyn CommandRunner>,
    binary: String,
}

impl IncusClient {
    pub fn new(runner: Arc<dyn CommandRunner>, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub async fn list_instances(&self) -> Result<Vec<InstanceRecord>, CommandError> {
        self.run_json(vec!["list".into(), "--format".into(), "json".into()])
            .await
    }

    /// Raw `incus list` table, parsed by instance discovery
    pub async fn list_instances_table(&self) -> Result<String, CommandError> {
        self.run(vec!["list".into()]).await
    }

    pub async fn list_snapshots(&self, instance: &str) -> Result<Vec<SnapshotRecord>, CommandError> {
        self.run_json(vec![
            "snapshot".into(),
            "list".into(),
            instance.into(),
            "--format".into(),
            "json".into(),
        ])
        .await
    }

    pub async fn create_snapshot(
        &self,
        instance: &str,
        snapshot: &str,
        stateful: bool,
    ) -> Result<(), CommandError> {
        let mut args: Vec<String> = vec!["snapshot".into(), "create".into()];
        if stateful {
            args.push("--stateful".into());
        }
        args.push(instance.into());
        args.push(snapshot.into());

        self.run(args).await.map(|_| ())
    }

    pub async fn delete_snapshot(&self, instance: &str, snapshot: &str) -> Result<(), CommandError> {
        self.run(vec![
            "snapshot".into(),
            "delete".into(),
            instance.into(),
            snapshot.into(),
        ])
        .await
        .map(|_| ())
    }

    pub async fn export_instance(
        &self,
        instance: &str,
        destination: &Path,
        options: &ExportOptions,
    ) -> Result<(), CommandError> {
        let mut args: Vec<String> = vec![
            "export".into(),
            instance.into(),
            destination.to_string_lossy().into_owned(),
        ];
        if options.optimized_storage {
            args.push("--optimized-storage".into());
        }
        if options.instance_only {
            args.push("--instance-only".into());
        }

        self.run(args).await.map(|_| ())
    }

    pub async fn list_storage_volumes(
        &self,
        storage_pool: &str,
    ) -> Result<Vec<StorageVolumeRecord>, CommandError> {
        self.run_json(vec![
            "storage".into(),
            "volume".into(),
            "list".into(),
            storage_pool.into(),
            "--all-projects".into(),
            "--format".into(),
            "json".into(),
        ])
        .await
    }

    pub async fn export_volume(
        &self,
        storage_pool: &str,
        volume: &str,
        destination: &Path,
        project: &str,
        optimized_storage: bool,
    ) -> Result<(), CommandError> {
        let mut args: Vec<String> = vec![
            "storage".into(),
            "volume".into(),
            "export".into(),
            storage_pool.into(),
            volume.into(),
            destination.to_string_lossy().into_owned(),
            "--project".into(),
            project.into(),
        ];
        if optimized_storage {
            args.push("--optimized-storage".into());
        }

        self.run(args).await.map(|_| ())
    }

    async fn run(&self, args: Vec<String>) -> Result<String, CommandError> {
        self.runner.run(&self.binary, &args).await
    }

    async fn run_json<T: DeserializeOwned>(&self, args: Vec<String>) -> Result<T, CommandError> {
        let output = self.run(args.clone()).await?;
        serde_json::from_str(&output).map_err(|e| CommandError::Decode {
            command: render_command(&self.binary, &args),
            reason: e.to_string(),
        })
    }
}
