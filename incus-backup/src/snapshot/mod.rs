// File: incus-backup/src/snapshot/mod.rs

//! Instance snapshot lifecycle
//!
//! Snapshots are taken once per run under a shared name
//! (`snapshot-YYYYMMDDHHMMSS`) and pruned by the age reported by Incus.
//!
//! # Stateful snapshots
//!
//! When stateful snapshots are requested the running state (memory, open
//! connections) is captured as well. Instances that cannot be snapshotted
//! statefully get a stateless snapshot under the same name instead; this is
//! logged as a warning and is not a failure.
//!
//! # Pruning
//!
//! `created_at` values arrive with anywhere from zero to nine fractional
//! digits. They are normalized to microseconds before comparison, see
//! [`parse_created_at`].

pub mod manager;
pub mod timestamp;

pub use manager::{SnapshotKind, SnapshotManager, SnapshotPruneSummary};
pub use timestamp::parse_created_at;
