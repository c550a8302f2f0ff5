//! Error types for the backup engine
//!
//! Each stage has its own error enum so that callers can tell a snapshot
//! failure from an export failure without string matching. Every variant
//! carries the instance or path it concerns plus the underlying cause.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for a backup run
#[derive(Debug, Error)]
pub enum BackupError {
    /// The backup directory could not be prepared; nothing else runs
    #[error("Failed to create backup directory '{}': {source}", .path.display())]
    Precondition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Prune(#[from] PruneError),
}

/// Failures of the command-execution seam
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started at all
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited with a non-zero status
    #[error("Error during command '{command}': {message}")]
    Failed { command: String, message: String },

    /// The program succeeded but its output was not what we expected
    #[error("Failed to decode output of '{command}': {reason}")]
    Decode { command: String, reason: String },
}

/// Snapshot lifecycle errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to list snapshots for {instance}: {source}")]
    List {
        instance: String,
        #[source]
        source: CommandError,
    },

    /// Raised only after the stateless attempt failed as well
    #[error("Failed to create snapshot '{snapshot}' for {instance}: {source}")]
    CreateFailed {
        instance: String,
        snapshot: String,
        #[source]
        source: CommandError,
    },
}

/// Export errors, one per archive
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Error exporting {target}: {source}")]
    Command {
        target: String,
        #[source]
        source: CommandError,
    },

    /// The command reported success but left no file behind
    #[error("Backup file '{}' not found after export of {target}", .path.display())]
    MissingOutput { target: String, path: PathBuf },

    #[error("Failed to inspect backup file '{}': {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Archive pruning errors; raised only when the directory cannot be listed
#[derive(Debug, Error)]
pub enum PruneError {
    #[error("Failed to read backup directory '{}': {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Snapshot `created_at` values that cannot be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid timestamp '{value}': {reason}")]
pub struct TimestampError {
    pub value: String,
    pub reason: String,
}

impl TimestampError {
    pub fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
