//! Archive files in the backup directory
//!
//! The filename is the schema: `<instance>-<YYYYMMDDHHMMSS>.tar.gz` for
//! instance exports and `<instance>-block-<volume>-<YYYYMMDDHHMMSS>.tar.gz`
//! for volume exports. [`ArchiveName`] is the only code that writes or
//! reads that format, so exports and retention cannot drift apart.

pub mod naming;
pub mod pruner;

pub use naming::ArchiveName;
pub use pruner::{retention_cutoff, ArchivePruneSummary, RetentionPruner};
