//! Transport capability consumed by the matcher and the engine
//!
//! The decision core never talks to a concrete protocol. Every transport
//! (FTP, HTTP, rsync, local copy) implements [`Transport`]; the matcher only
//! calls back into `list` during recursive descent, and the engine hands the
//! final download set to `download`.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entry::FileEntry;
use crate::error::Result;

/// One directory level as reported by a transport
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    /// Plain files in this directory
    pub files: Vec<FileEntry>,
    /// Subdirectories in this directory
    pub dirs: Vec<FileEntry>,
}

/// Opaque `user:password` credential carrier.
///
/// Passed through to transports unmodified; the core never parses or
/// validates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(userpwd: impl Into<String>) -> Self {
        Self(userpwd.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Capability interface over a remote (or local) file source.
///
/// `list` takes a slash-separated path relative to the transport root;
/// leading and trailing slashes are insignificant. Listing and transfer
/// failures are fatal for the current run: no retry logic lives here.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The matching root that selected entries are stamped with
    fn root(&self) -> &Path;

    /// List one directory level
    async fn list(&self, path: &str) -> Result<Listing>;

    /// Fetch the given files into `local_dir`, preserving their
    /// slash-separated names below it. Returns the transferred entries.
    async fn download(&self, files: &[FileEntry], local_dir: &Path) -> Result<Vec<FileEntry>>;

    /// Hand credentials to the transport. Transports that do not
    /// authenticate ignore them.
    fn set_credentials(&mut self, _credentials: &Credentials) {}

    /// Release any connection held by the transport
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
