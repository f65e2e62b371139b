//! Remote and cached file entries with their identity signature

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};

/// One remote or locally-cached file, as reported by a directory listing.
///
/// The modification time is carried as a calendar triple rather than an
/// instant: remote listings only expose day precision, and the identity
/// signature must compare equal across transports that report at different
/// granularities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the matching root, slash-separated
    pub name: String,
    /// The root this entry resolves under, stamped during matching or
    /// reconciliation, never by the listing source
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub root: Option<PathBuf>,
    /// Year of the remote modification time
    pub year: i32,
    /// Month of the remote modification time (1-12)
    pub month: u32,
    /// Day of the remote modification time (1-31)
    pub day: u32,
    /// Size in bytes
    pub size: u64,
}

/// Identity signature: the low-cost proxy for "content unchanged".
///
/// Two entries with equal signatures are treated as identical content
/// without inspecting bytes.
pub type Signature<'a> = (&'a str, i32, u32, u32, u64);

impl FileEntry {
    /// Create an entry from its listing fields
    pub fn new(name: impl Into<String>, year: i32, month: u32, day: u32, size: u64) -> Self {
        Self {
            name: name.into(),
            root: None,
            year,
            month,
            day,
            size,
        }
    }

    /// Build an entry from local file metadata, decomposing the mtime in UTC
    pub fn from_metadata(name: impl Into<String>, metadata: &std::fs::Metadata) -> Self {
        let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let date = DateTime::<Utc>::from(mtime).date_naive();
        Self {
            name: name.into(),
            root: None,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            size: metadata.len(),
        }
    }

    /// The identity signature of this entry
    pub fn signature(&self) -> Signature<'_> {
        (self.name.as_str(), self.year, self.month, self.day, self.size)
    }

    /// Validate and return the calendar date of the remote modification time
    pub fn modified_date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            MirrorError::InvalidDate {
                name: self.name.clone(),
                year: self.year,
                month: self.month,
                day: self.day,
            }
        })
    }

    /// The local path this entry resolves to, if a root has been stamped
    pub fn local_path(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| join_name(root, &self.name))
    }
}

/// Join a slash-separated entry name onto a filesystem root
pub(crate) fn join_name(root: &Path, name: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in name.split('/').filter(|p| !p.is_empty()) {
        path.push(part);
    }
    path
}
