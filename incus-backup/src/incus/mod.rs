//! Access to the Incus control plane
//!
//! [`CommandRunner`] is the only place where processes are spawned; tests
//! swap it for a scripted runner. [`IncusClient`] turns every control-plane
//! operation the engine needs into an argument vector and decodes the JSON
//! responses into typed records.

pub mod client;
pub mod commands;

pub use client::{IncusClient, InstanceRecord, SnapshotRecord, StorageVolumeRecord};
pub use commands::{render_command, CommandRunner, SystemCommandRunner};
