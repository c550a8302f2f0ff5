//! Central repository for naming conventions, defaults and unit conversions
//!
//! Archive names are parsed back by the retention pruner, so everything that
//! shapes a filename lives here and nowhere else.

/// Control-plane binary constants
pub mod incus {
    /// Binary invoked when the configuration does not override it
    pub const DEFAULT_BINARY: &str = "incus";
}

/// Archive filename constants
pub mod archive {
    /// Suffix of every archive written by an export
    pub const SUFFIX: &str = ".tar.gz";

    /// Timestamp token embedded between the last hyphen and the suffix
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

    /// Number of digits in a rendered timestamp token
    pub const TIMESTAMP_LEN: usize = 14;

    /// Separator between instance and volume name in volume archives
    pub const VOLUME_MARKER: &str = "-block-";
}

/// Snapshot constants
pub mod snapshot {
    /// Prefix of snapshots created by a run; the run timestamp follows it
    pub const NAME_PREFIX: &str = "snapshot-";

    /// Microsecond precision used when normalizing `created_at`
    pub const FRACTION_DIGITS: usize = 6;
}

/// Retention bounds
pub mod retention {
    /// Longest accepted retention window, about a century
    pub const MAX_DAYS: u32 = 36_500;
}

/// Configuration defaults
pub mod defaults {
    pub const CONFIG_PATH: &str = "config/main.toml";
    pub const SNAPSHOT_RETENTION_DAYS: u32 = 7;
    pub const ARCHIVE_RETENTION_DAYS: u32 = 14;
    pub const STORAGE_POOL: &str = "default";
    pub const PROJECT: &str = "default";
}

/// Bytes in one megabyte as reported in export metrics
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
