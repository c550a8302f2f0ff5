//! Integration tests for instance and volume exports
//!
//! A successful exit status is not enough: the archive has to be on disk
//! afterwards. These tests script both honest and lying exports.

mod common;

use common::*;
use incus_backup::errors::ExportError;
use incus_backup::{ExportOptions, ExportPipeline, IncusClient};
use std::sync::Arc;
use tempfile::TempDir;

fn pipeline_for(runner: &Arc<MockRunner>, options: ExportOptions) -> ExportPipeline {
    ExportPipeline::new(Arc::new(IncusClient::new(runner.clone(), "incus")), options)
}

#[tokio::test]
async fn test_instance_export_reports_size_and_throughput() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("web1-20240301000000.tar.gz");
    let runner = MockRunner::new()
        .on(&["export", "web1"], Reply::WriteFile { path_arg: 2, size: 4096 })
        .into_arc();

    let metrics = pipeline_for(&runner, ExportOptions::default())
        .export_instance("web1", &destination)
        .await
        .unwrap();

    assert_eq!(metrics.size_bytes, 4096);
    assert_eq!(metrics.path, destination);
    assert!(metrics.throughput_mb_s > 0.0);
    assert_eq!(
        runner.calls(),
        vec![vec![
            "export".to_string(),
            "web1".to_string(),
            destination.to_string_lossy().into_owned(),
            "--optimized-storage".to_string(),
            "--instance-only".to_string(),
        ]]
    );
}

#[tokio::test]
async fn test_export_flags_follow_options() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("web1-20240301000000.tar.gz");
    let runner = MockRunner::new()
        .on(&["export"], Reply::WriteFile { path_arg: 2, size: 1 })
        .into_arc();
    let options = ExportOptions {
        optimized_storage: false,
        instance_only: false,
    };

    pipeline_for(&runner, options)
        .export_instance("web1", &destination)
        .await
        .unwrap();

    assert_eq!(runner.calls()[0].len(), 3);
}

#[tokio::test]
async fn test_success_without_archive_is_a_failure() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("web1-20240301000000.tar.gz");
    let runner = MockRunner::new()
        .on(&["export"], Reply::Silent)
        .into_arc();

    let err = pipeline_for(&runner, ExportOptions::default())
        .export_instance("web1", &destination)
        .await
        .unwrap_err();

    match err {
        ExportError::MissingOutput { target, path } => {
            assert_eq!(target, "instance web1");
            assert_eq!(path, destination);
        }
        other => panic!("expected MissingOutput, got {other:?}"),
    }
}

#[tokio::test]
async fn test_directory_at_destination_is_missing_output() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("web1-20240301000000.tar.gz");
    std::fs::create_dir(&destination).unwrap();
    let runner = MockRunner::new()
        .on(&["export"], Reply::Silent)
        .into_arc();

    let err = pipeline_for(&runner, ExportOptions::default())
        .export_instance("web1", &destination)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::MissingOutput { ref path, .. } if path == &destination
    ));
}

#[tokio::test]
async fn test_command_failure_is_distinct_from_missing_output() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("web1-20240301000000.tar.gz");
    let runner = MockRunner::new()
        .on(&["export"], Reply::Fail("Error: Instance is busy".into()))
        .into_arc();

    let err = pipeline_for(&runner, ExportOptions::default())
        .export_instance("web1", &destination)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Command { .. }));
    assert!(err.to_string().contains("Instance is busy"));
}

#[tokio::test]
async fn test_volume_export_passes_pool_and_project() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("web1-block-data-20240301000000.tar.gz");
    let runner = MockRunner::new()
        .on(
            &["storage", "volume", "export"],
            Reply::WriteFile { path_arg: 5, size: 2048 },
        )
        .into_arc();

    let metrics = pipeline_for(&runner, ExportOptions::default())
        .export_volume("fast", "data", &destination, "prod")
        .await
        .unwrap();

    assert_eq!(metrics.size_bytes, 2048);
    assert_eq!(metrics.target, "volume fast/data");
    assert_eq!(
        runner.calls(),
        vec![vec![
            "storage".to_string(),
            "volume".to_string(),
            "export".to_string(),
            "fast".to_string(),
            "data".to_string(),
            destination.to_string_lossy().into_owned(),
            "--project".to_string(),
            "prod".to_string(),
            "--optimized-storage".to_string(),
        ]]
    );
}

#[tokio::test]
async fn test_volume_export_without_archive_is_a_failure() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("web1-block-data-20240301000000.tar.gz");
    let runner = MockRunner::new()
        .on(&["storage", "volume", "export"], Reply::Silent)
        .into_arc();

    let result = pipeline_for(&runner, ExportOptions::default())
        .export_volume("default", "data", &destination, "default")
        .await;

    assert!(matches!(result, Err(ExportError::MissingOutput { .. })));
}
