pub mod archive;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod errors;
pub mod export;
pub mod incus;
pub mod orchestrator;
pub mod snapshot;

// Re-export commonly used types
pub use archive::{ArchiveName, ArchivePruneSummary, RetentionPruner};
pub use config::{Config, ConfigManager, InstanceListing};
pub use discovery::{InstanceDiscovery, VolumeDiscovery, VolumeMap};
pub use errors::{BackupError, CommandError, ExportError, PruneError, SnapshotError, TimestampError};
pub use export::{ExportMetrics, ExportOptions, ExportPipeline};
pub use incus::{CommandRunner, IncusClient, SystemCommandRunner};
pub use orchestrator::{InstanceFailure, InstanceReport, Orchestrator, RunOutcome, RunReport, RunState};
pub use snapshot::{SnapshotKind, SnapshotManager, SnapshotPruneSummary};
