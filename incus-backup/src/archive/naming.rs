use chrono::NaiveDateTime;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::archive::{SUFFIX, TIMESTAMP_FORMAT, TIMESTAMP_LEN, VOLUME_MARKER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    pub instance: String,
    pub volume: Option<String>,
    /// UTC, whole seconds
    pub timestamp: NaiveDateTime,
}

impl ArchiveName {
    pub fn for_instance(instance: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            instance: instance.into(),
            volume: None,
            timestamp,
        }
    }

    pub fn for_volume(
        instance: impl Into<String>,
        volume: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            instance: instance.into(),
            volume: Some(volume.into()),
            timestamp,
        }
    }

    pub fn file_name(&self) -> String {
        self.to_string()
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    /// Decode a filename written by [`ArchiveName::file_name`].
    ///
    /// Returns `None` unless the name ends in `.tar.gz` and the token between
    /// the last hyphen and the suffix is a valid 14-digit timestamp.
    ///
    /// Only the timestamp is authoritative. The prefix is split at the last
    /// `-block-`, so an instance whose own name contains `-block-` decodes
    /// with the wrong `instance`/`volume` split. `file_name()` of the result
    /// still reproduces the original name.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(SUFFIX)?;
        let (prefix, token) = stem.rsplit_once('-')?;
        let timestamp = parse_timestamp_token(token)?;

        if prefix.is_empty() {
            return None;
        }

        let (instance, volume) = match prefix.rsplit_once(VOLUME_MARKER) {
            Some((instance, volume)) if !instance.is_empty() && !volume.is_empty() => {
                (instance.to_string(), Some(volume.to_string()))
            }
            _ => (prefix.to_string(), None),
        };

        Some(Self {
            instance,
            volume,
            timestamp,
        })
    }

    /// Whether `file_name` claims to be an archive at all
    pub fn has_archive_suffix(file_name: &str) -> bool {
        file_name.ends_with(SUFFIX)
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stamp = self.timestamp.format(TIMESTAMP_FORMAT);
        match &self.volume {
            Some(volume) => write!(f, "{}{}{}-{}{}", self.instance, VOLUME_MARKER, volume, stamp, SUFFIX),
            None => write!(f, "{}-{}{}", self.instance, stamp, SUFFIX),
        }
    }
}

fn parse_timestamp_token(token: &str) -> Option<NaiveDateTime> {
    if token.len() != TIMESTAMP_LEN || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(token, TIMESTAMP_FORMAT).ok()
}
