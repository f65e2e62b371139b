//! Local-copy transport: serves a directory tree as the remote source

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::entry::{join_name, FileEntry};
use crate::error::{MirrorError, Result};
use crate::transport::{Listing, Transport};

/// Transport over a locally mounted directory tree.
///
/// Used when the dataset is reachable on a filesystem (NFS mounts, staging
/// areas) and by the test suite; the listing contract is identical to the
/// network transports.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    root: PathBuf,
}

impl LocalTransport {
    /// Create a transport rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        join_name(&self.root, path)
    }
}

#[async_trait]
impl Transport for LocalTransport {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn list(&self, path: &str) -> Result<Listing> {
        let dir = self.resolve(path);
        let mut reader = fs::read_dir(&dir).await.map_err(|e| {
            MirrorError::transport(path, format!("failed to list '{}': {}", dir.display(), e))
        })?;

        let mut listing = Listing::default();
        while let Some(entry) = reader.next_entry().await.map_err(|e| {
            MirrorError::transport(path, format!("failed to read '{}': {}", dir.display(), e))
        })? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = entry.metadata().await.map_err(|e| {
                MirrorError::transport(path, format!("failed to stat '{}': {}", name, e))
            })?;

            let file_entry = FileEntry::from_metadata(name, &metadata);
            if metadata.is_dir() {
                listing.dirs.push(file_entry);
            } else {
                listing.files.push(file_entry);
            }
        }

        debug!(
            path,
            files = listing.files.len(),
            dirs = listing.dirs.len(),
            "listed local directory"
        );
        Ok(listing)
    }

    async fn download(&self, files: &[FileEntry], local_dir: &Path) -> Result<Vec<FileEntry>> {
        let mut transferred = Vec::with_capacity(files.len());
        for file in files {
            let source = join_name(&self.root, &file.name);
            let dest = join_name(local_dir, &file.name);

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    MirrorError::transport(
                        file.name.clone(),
                        format!("failed to create '{}': {}", parent.display(), e),
                    )
                })?;
            }

            fs::copy(&source, &dest).await.map_err(|e| {
                MirrorError::transport(
                    file.name.clone(),
                    format!(
                        "failed to copy '{}' to '{}': {}",
                        source.display(),
                        dest.display(),
                        e
                    ),
                )
            })?;

            debug!(name = %file.name, dest = %dest.display(), "downloaded file");
            let mut done = file.clone();
            done.root = Some(local_dir.to_path_buf());
            transferred.push(done);
        }
        Ok(transferred)
    }
}
