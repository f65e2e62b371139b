//! Error types for the mirror library

use std::path::PathBuf;

/// Result type alias for mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Error type for mirror operations
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// No remote file matched the configured patterns
    #[error("no file found matching expressions: {patterns:?}")]
    NoMatch { patterns: Vec<String> },

    /// Pattern compilation errors
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Transport-level failures (listing or transfer)
    #[error("transport error at '{path}': {message}")]
    Transport { path: String, message: String },

    /// A listing entry carries a calendar date that does not exist
    #[error("invalid modification date {year:04}-{month:02}-{day:02} for '{name}'")]
    InvalidDate {
        name: String,
        year: i32,
        month: u32,
        day: u32,
    },

    /// Timestamp application errors
    #[error("failed to set timestamps on '{path}': {message}")]
    Timestamp { path: PathBuf, message: String },

    /// Snapshot inventory scanning errors
    #[error("snapshot scan error at '{path}': {message}")]
    SnapshotScan { path: PathBuf, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MirrorError {
    /// Create a no-match error carrying the pattern set that failed
    pub fn no_match<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::NoMatch {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a pattern compilation error
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a transport error
    pub fn transport(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a timestamp application error
    pub fn timestamp(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Timestamp {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a snapshot scan error
    pub fn snapshot_scan(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SnapshotScan {
            path: path.into(),
            message: message.into(),
        }
    }
}
