//! Building the available-file inventory from a prior snapshot root

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::entry::FileEntry;
use crate::error::{MirrorError, Result};

/// Walk a prior snapshot root and return its files as an inventory for
/// reconciliation. Names are slash-separated relative to `root`; the mtime
/// decomposition matches what transports report, so signatures of unchanged
/// files compare equal across runs.
pub fn scan_inventory(root: &Path) -> Result<Vec<FileEntry>> {
    let mut entries = Vec::new();

    for result in WalkDir::new(root) {
        let dirent =
            result.map_err(|e| MirrorError::snapshot_scan(root, format!("walk error: {}", e)))?;

        if !dirent.file_type().is_file() {
            continue;
        }

        let relative = dirent.path().strip_prefix(root).map_err(|e| {
            MirrorError::snapshot_scan(
                dirent.path(),
                format!("failed to create relative path: {}", e),
            )
        })?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let metadata = dirent.metadata().map_err(|e| {
            MirrorError::snapshot_scan(dirent.path(), format!("failed to read metadata: {}", e))
        })?;

        entries.push(FileEntry::from_metadata(name, &metadata));
    }

    debug!(root = %root.display(), files = entries.len(), "scanned snapshot inventory");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_inventory_relative_names() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        std::fs::write(root.join("top.txt"), b"1").unwrap();
        std::fs::create_dir_all(root.join("data").join("sub")).unwrap();
        std::fs::write(root.join("data").join("sub").join("deep.txt"), b"22").unwrap();

        let mut inventory = scan_inventory(root).unwrap();
        inventory.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory[0].name, "data/sub/deep.txt");
        assert_eq!(inventory[0].size, 2);
        assert_eq!(inventory[1].name, "top.txt");
        // directories themselves are not inventory entries
        assert!(inventory.iter().all(|e| !e.name.ends_with("data")));
    }

    #[test]
    fn test_scan_inventory_missing_root() {
        let temp = TempDir::new().unwrap();
        let result = scan_inventory(&temp.path().join("absent"));
        assert!(matches!(result, Err(MirrorError::SnapshotScan { .. })));
    }
}
