//! Recursive pattern matching over remote directory listings
//!
//! Patterns are slash-separated regular expressions. Every segment is
//! matched start-anchored against one path component: intermediate segments
//! select subdirectories to descend into (listing them back through the
//! transport), the final segment selects files. A leading segment that is
//! exactly `^` is an anchor marker and is stripped.

use futures::future::BoxFuture;
use regex::Regex;
use tracing::debug;

use crate::error::{MirrorError, Result};
use crate::selection::SyncSelection;
use crate::transport::{Listing, Transport};

/// A pattern segment compiled for start-anchored matching, the way the
/// declarative pattern dialect is defined: a match must begin at the first
/// character of the component but need not span all of it.
#[derive(Debug, Clone)]
struct StartAnchored {
    regex: Regex,
}

impl StartAnchored {
    fn compile(segment: &str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{segment})"))
            .map_err(|e| MirrorError::pattern(pattern, e))?;
        Ok(Self { regex })
    }

    fn is_match(&self, component: &str) -> bool {
        self.regex.is_match(component)
    }
}

/// One declarative pattern, pre-split into compiled segments
#[derive(Debug, Clone)]
struct Pattern {
    raw: String,
    segments: Vec<StartAnchored>,
}

impl Pattern {
    fn compile(raw: &str) -> Result<Self> {
        let mut parts: Vec<&str> = raw.split('/').collect();
        if parts.first() == Some(&"^") {
            parts.remove(0);
        }
        let segments = parts
            .iter()
            .map(|part| StartAnchored::compile(part, raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }
}

/// Matches declarative file-name patterns against a remote directory tree.
///
/// The matcher appends every selected file to the selection's download list,
/// stamping its `root` and prepending the directory prefix accumulated
/// during descent. It never sorts and never dedupes: output order is
/// traversal order, and a file selected by two overlapping patterns appears
/// twice.
pub struct PatternMatcher {
    patterns: Vec<Pattern>,
}

impl PatternMatcher {
    /// Compile a pattern set. Fails on the first invalid pattern.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|raw| Pattern::compile(raw.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// The raw pattern strings, in the order supplied
    pub fn raw_patterns(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.raw.clone()).collect()
    }

    /// Match every pattern against the given root listing, descending into
    /// subdirectories through `source` as needed, and append the selected
    /// files to `selection.to_download`.
    ///
    /// Fails with [`MirrorError::NoMatch`] when the download list is still
    /// empty once every pattern has been processed. The check runs once, at
    /// the end of this call: a barren subdirectory descent cannot abort
    /// patterns that have not run yet.
    pub async fn match_listing(
        &self,
        source: &dyn Transport,
        listing: &Listing,
        selection: &mut SyncSelection,
    ) -> Result<()> {
        debug!(patterns = ?self.raw_patterns(), "matching patterns against root listing");
        for pattern in &self.patterns {
            self.match_segments(source, &pattern.segments, listing, String::new(), selection)
                .await?;
        }
        if selection.to_download.is_empty() {
            return Err(MirrorError::no_match(self.raw_patterns()));
        }
        Ok(())
    }

    fn match_segments<'a>(
        &'a self,
        source: &'a dyn Transport,
        segments: &'a [StartAnchored],
        listing: &'a Listing,
        prefix: String,
        selection: &'a mut SyncSelection,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let (head, rest) = match segments.split_first() {
                Some(split) => split,
                None => return Ok(()),
            };

            if rest.is_empty() {
                // Final segment selects files under the accumulated prefix
                for file in &listing.files {
                    if !head.is_match(&file.name) {
                        continue;
                    }
                    let mut matched = file.clone();
                    matched.root = Some(source.root().to_path_buf());
                    if !prefix.is_empty() {
                        matched.name =
                            format!("{}/{}", prefix.trim_start_matches('/'), matched.name);
                    }
                    debug!(name = %matched.name, "pattern matched file");
                    selection.push_download(matched);
                }
                return Ok(());
            }

            // Intermediate segment selects subdirectories to descend into
            for dir in &listing.dirs {
                if !head.is_match(&dir.name) {
                    continue;
                }
                debug!(subdir = %dir.name, prefix = %prefix, "descending into matching subdirectory");
                let sub_listing = source.list(&format!("{}/{}/", prefix, dir.name)).await?;
                let sub_prefix = format!("{}/{}", prefix, dir.name);
                self.match_segments(source, rest, &sub_listing, sub_prefix, &mut *selection)
                    .await?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = PatternMatcher::new(["[unclosed"]);
        assert!(matches!(result, Err(MirrorError::Pattern { .. })));
    }

    #[test]
    fn test_anchor_marker_stripped() {
        let pattern = Pattern::compile("^/data/.*").unwrap();
        assert_eq!(pattern.segments.len(), 2);
        assert!(pattern.segments[0].is_match("data"));
    }

    #[test]
    fn test_start_anchored_semantics() {
        let segment = StartAnchored::compile("db_.*", "db_.*").unwrap();
        assert!(segment.is_match("db_release"));
        // matches need not span the whole component
        assert!(segment.is_match("db_release.bak"));
        // but must begin at the first character
        assert!(!segment.is_match("old_db_release"));
    }
}
