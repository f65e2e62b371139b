//! Mirror Library
//!
//! The synchronization-decision core of a multi-protocol remote-dataset
//! mirroring tool:
//! - Recursive pattern matching against remote directory listings
//! - Reuse/diff partitioning against a prior local snapshot
//! - Transport capability seam with a local-copy implementation
//! - Bounded-concurrency transfer execution with progress reporting
//! - Modification-date preservation on mirrored files

pub mod differ;
pub mod engine;
pub mod entry;
pub mod error;
pub mod local;
pub mod matcher;
pub mod progress;
pub mod selection;
pub mod snapshot;
pub mod timestamps;
pub mod transport;

// Re-export main types and functions
pub use differ::ReuseDiffer;
pub use engine::{MirrorEngine, MirrorOptions, MirrorReport};
pub use entry::{FileEntry, Signature};
pub use error::{MirrorError, Result};
pub use local::LocalTransport;
pub use matcher::PatternMatcher;
pub use progress::{DatasetProgress, NullProgress, ProgressSink};
pub use selection::{PlanSummary, SyncSelection, TransferPlan};
pub use snapshot::scan_inventory;
pub use timestamps::TimestampApplier;
pub use transport::{Credentials, Listing, Transport};

use std::path::Path;

/// Compute the transfer plan for one run without executing it
pub async fn plan_mirror(transport: &dyn Transport, options: MirrorOptions) -> Result<TransferPlan> {
    let engine = MirrorEngine::new(options)?;
    engine.plan(transport).await
}

/// Plan and execute one mirror run into `local_dir`, recording progress
/// against the configured dataset identifier (a no-op when none is set)
pub async fn mirror_dataset(
    transport: &mut dyn Transport,
    options: MirrorOptions,
    local_dir: impl AsRef<Path>,
) -> Result<MirrorReport> {
    let progress = DatasetProgress::new(options.dataset.clone());
    let engine = MirrorEngine::new(options)?;
    engine.run(transport, local_dir.as_ref(), &progress).await
}

#[cfg(test)]
mod matcher_tests;
