//! Reuse/diff decision against a prior snapshot inventory

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::entry::{join_name, FileEntry, Signature};
use crate::selection::SyncSelection;

/// Partitions a matched selection into "copy from the previous snapshot"
/// versus "must download", keyed on the identity signature.
///
/// Reconciliation never fails: a missing or unreadable local file is always
/// reclassified as a download, never dropped.
#[derive(Debug, Clone)]
pub struct ReuseDiffer {
    check_exists: bool,
}

impl Default for ReuseDiffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReuseDiffer {
    /// Create a differ that verifies local existence before reusing a file
    pub fn new() -> Self {
        Self { check_exists: true }
    }

    /// Create a differ with the existence check toggled explicitly.
    /// Bypassing it trusts the inventory blindly.
    pub fn with_existence_check(check_exists: bool) -> Self {
        Self { check_exists }
    }

    /// Repartition `selection` against the files available under `root_dir`.
    ///
    /// Both the inventory and the download list are sorted by name first;
    /// entries whose signature is absent from the inventory are downloads,
    /// the rest are copy candidates subject to the existence check. Every
    /// entry that went in comes out in exactly one of the two lists.
    pub fn reconcile(
        &self,
        selection: &mut SyncSelection,
        mut available: Vec<FileEntry>,
        root_dir: &Path,
    ) {
        available.sort_by(|a, b| a.name.cmp(&b.name));
        selection.to_download.sort_by(|a, b| a.name.cmp(&b.name));

        let known: HashSet<Signature<'_>> = available.iter().map(FileEntry::signature).collect();
        let new_or_modified: Vec<String> = selection
            .to_download
            .iter()
            .filter(|entry| !known.contains(&entry.signature()))
            .map(|entry| entry.name.clone())
            .collect();
        drop(known);

        debug!(
            selected = selection.to_download.len(),
            available = available.len(),
            new_or_modified = new_or_modified.len(),
            root = %root_dir.display(),
            "reconciling selection against snapshot inventory"
        );

        let mut downloads = Vec::new();
        let mut copies = Vec::new();
        let mut cursor = 0;

        for mut file in std::mem::take(&mut selection.to_download) {
            if cursor < new_or_modified.len() && file.name == new_or_modified[cursor] {
                debug!(name = %file.name, "new or modified, must download");
                downloads.push(file);
                cursor += 1;
            } else if !self.check_exists || local_file_exists(root_dir, &file.name) {
                file.root = Some(root_dir.to_path_buf());
                debug!(name = %file.name, "unchanged, reusing snapshot copy");
                copies.push(file);
            } else {
                warn!(
                    name = %file.name,
                    root = %root_dir.display(),
                    "cached copy missing despite unchanged signature, falling back to download"
                );
                downloads.push(file);
            }
        }

        selection.to_download = downloads;
        selection.to_copy = copies;
    }
}

/// Existence probe over the snapshot root. Probe errors (permission loss,
/// dangling links) count as missing: the entry gets downloaded again.
fn local_file_exists(root_dir: &Path, name: &str) -> bool {
    join_name(root_dir, name).try_exists().unwrap_or(false)
}
