//! Applying remote modification dates to local files

use std::path::Path;

use chrono::NaiveTime;

use crate::entry::FileEntry;
use crate::error::{MirrorError, Result};

/// Applies an entry's nominal modification date to a local file.
///
/// Locally cached files must carry the remote's calendar date: the date
/// feeds the identity signature of the next run, so a copy that kept its
/// download-time mtime would look modified forever.
#[derive(Debug, Clone, Default)]
pub struct TimestampApplier;

impl TimestampApplier {
    pub fn new() -> Self {
        Self
    }

    /// Set `path`'s access and modification times to midnight UTC of the
    /// entry's calendar date. Invalid dates and filesystem errors propagate.
    pub fn apply(&self, entry: &FileEntry, path: &Path) -> Result<()> {
        let date = entry.modified_date()?;
        let settime = date.and_time(NaiveTime::MIN).and_utc().timestamp();
        utime::set_file_times(path, settime, settime)
            .map_err(|e| MirrorError::timestamp(path, e.to_string()))
    }
}
