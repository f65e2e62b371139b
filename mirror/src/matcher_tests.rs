//! Unit tests for recursive pattern matching over an in-memory transport

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::entry::FileEntry;
use crate::error::{MirrorError, Result};
use crate::matcher::PatternMatcher;
use crate::selection::SyncSelection;
use crate::transport::{Listing, Transport};

/// In-memory transport serving canned listings keyed by normalized path
struct MockTransport {
    root: PathBuf,
    listings: HashMap<String, Listing>,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            root: PathBuf::from("/remote"),
            listings: HashMap::new(),
        }
    }

    fn with_listing(mut self, path: &str, listing: Listing) -> Self {
        self.listings.insert(path.trim_matches('/').to_string(), listing);
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn list(&self, path: &str) -> Result<Listing> {
        let key = path.trim_matches('/');
        self.listings
            .get(key)
            .cloned()
            .ok_or_else(|| MirrorError::transport(path, "no such directory"))
    }

    async fn download(&self, files: &[FileEntry], _local_dir: &Path) -> Result<Vec<FileEntry>> {
        Ok(files.to_vec())
    }
}

fn file(name: &str) -> FileEntry {
    FileEntry::new(name, 2023, 1, 1, 10)
}

fn dir(name: &str) -> FileEntry {
    FileEntry::new(name, 2023, 1, 1, 0)
}

fn listing(files: Vec<FileEntry>, dirs: Vec<FileEntry>) -> Listing {
    Listing { files, dirs }
}

async fn run_match(
    transport: &MockTransport,
    patterns: &[&str],
) -> Result<SyncSelection> {
    let matcher = PatternMatcher::new(patterns)?;
    let root_listing = transport.list("").await?;
    let mut selection = SyncSelection::new();
    matcher
        .match_listing(transport, &root_listing, &mut selection)
        .await?;
    Ok(selection)
}

#[tokio::test]
async fn test_single_segment_match() {
    let transport = MockTransport::new().with_listing(
        "",
        listing(vec![file("alu.fa"), file("alu.idx"), file("readme")], vec![]),
    );

    let selection = run_match(&transport, &["alu\\..*"]).await.unwrap();

    let names: Vec<_> = selection.to_download.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["alu.fa", "alu.idx"]);
    for entry in &selection.to_download {
        assert_eq!(entry.root.as_deref(), Some(Path::new("/remote")));
    }
}

#[tokio::test]
async fn test_no_match_raises() {
    let transport = MockTransport::new().with_listing(
        "",
        listing(vec![file("other.txt")], vec![]),
    );

    let matcher = PatternMatcher::new(["nomatch\\.txt"]).unwrap();
    let root_listing = transport.list("").await.unwrap();
    let mut selection = SyncSelection::new();
    let result = matcher
        .match_listing(&transport, &root_listing, &mut selection)
        .await;

    assert!(matches!(result, Err(MirrorError::NoMatch { .. })));
    assert!(selection.to_download.is_empty());
}

#[tokio::test]
async fn test_recursive_prefix_composition() {
    let transport = MockTransport::new()
        .with_listing("", listing(vec![], vec![dir("data")]))
        .with_listing(
            "data",
            listing(vec![FileEntry::new("a.txt", 2023, 1, 1, 10)], vec![]),
        );

    let selection = run_match(&transport, &["^/data/.*\\.txt$"]).await.unwrap();

    assert_eq!(selection.to_download.len(), 1);
    let matched = &selection.to_download[0];
    assert_eq!(matched.name, "data/a.txt");
    assert_eq!(matched.root.as_deref(), Some(Path::new("/remote")));
    assert_eq!(
        (matched.year, matched.month, matched.day, matched.size),
        (2023, 1, 1, 10)
    );
}

#[tokio::test]
async fn test_two_level_descent() {
    let transport = MockTransport::new()
        .with_listing("", listing(vec![], vec![dir("data")]))
        .with_listing("data", listing(vec![file("skip.txt")], vec![dir("sub")]))
        .with_listing("data/sub", listing(vec![file("deep.txt")], vec![]));

    let selection = run_match(&transport, &["data/sub/deep.*"]).await.unwrap();

    assert_eq!(selection.to_download.len(), 1);
    assert_eq!(selection.to_download[0].name, "data/sub/deep.txt");
}

#[tokio::test]
async fn test_barren_descent_does_not_abort_later_patterns() {
    // the first pattern descends into a directory holding nothing of
    // interest; the second pattern still gets its chance
    let transport = MockTransport::new()
        .with_listing(
            "",
            listing(vec![file("top.txt")], vec![dir("empty")]),
        )
        .with_listing("empty", listing(vec![], vec![]));

    let selection = run_match(&transport, &["empty/.*\\.dat", "top\\.txt"])
        .await
        .unwrap();

    let names: Vec<_> = selection.to_download.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["top.txt"]);
}

#[tokio::test]
async fn test_overlapping_patterns_keep_multiplicity() {
    let transport = MockTransport::new().with_listing(
        "",
        listing(vec![file("a.txt")], vec![]),
    );

    let selection = run_match(&transport, &["a.*", ".*\\.txt"]).await.unwrap();

    // no dedupe: the same file selected by two patterns appears twice
    assert_eq!(selection.to_download.len(), 2);
    assert_eq!(selection.to_download[0].name, "a.txt");
    assert_eq!(selection.to_download[1].name, "a.txt");
}

#[tokio::test]
async fn test_listing_failure_propagates() {
    // "data" matches a directory entry but the transport cannot list it
    let transport = MockTransport::new().with_listing(
        "",
        listing(vec![], vec![dir("data")]),
    );

    let result = run_match(&transport, &["data/.*"]).await;
    assert!(matches!(result, Err(MirrorError::Transport { .. })));
}

#[tokio::test]
async fn test_non_matching_directories_not_listed() {
    // only directories whose name matches the segment are descended into;
    // listing an unregistered path would error out
    let transport = MockTransport::new()
        .with_listing(
            "",
            listing(vec![], vec![dir("data"), dir("unrelated")]),
        )
        .with_listing("data", listing(vec![file("a.txt")], vec![]));

    let selection = run_match(&transport, &["data/a.*"]).await.unwrap();
    assert_eq!(selection.to_download.len(), 1);
}

#[tokio::test]
async fn test_match_soundness_against_patterns() {
    let transport = MockTransport::new()
        .with_listing(
            "",
            listing(
                vec![file("alu.fa"), file("notes.md")],
                vec![dir("db"), dir("docs")],
            ),
        )
        .with_listing("db", listing(vec![file("x.dat"), file("y.txt")], vec![]))
        .with_listing("docs", listing(vec![file("guide.md")], vec![]));

    let patterns = ["alu\\..*", "db/.*\\.dat"];
    let selection = run_match(&transport, &patterns).await.unwrap();

    // every selected name satisfies a start-anchored match against at least
    // one pattern, with prefixes composed from the descent
    let names: Vec<_> = selection.to_download.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["alu.fa", "db/x.dat"]);
}

#[tokio::test]
async fn test_empty_pattern_set_is_no_match() {
    let transport = MockTransport::new().with_listing(
        "",
        listing(vec![file("a.txt")], vec![]),
    );

    let result = run_match(&transport, &[]).await;
    assert!(matches!(result, Err(MirrorError::NoMatch { .. })));
}
