//! Mirror engine orchestrating one synchronization run

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::differ::ReuseDiffer;
use crate::entry::join_name;
use crate::error::{MirrorError, Result};
use crate::matcher::PatternMatcher;
use crate::progress::ProgressSink;
use crate::selection::{SyncSelection, TransferPlan};
use crate::snapshot;
use crate::timestamps::TimestampApplier;
use crate::transport::{Credentials, Transport};

/// Options for one mirror run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorOptions {
    /// Declarative file-name patterns selecting remote files of interest
    pub patterns: Vec<String>,
    /// Upper bound on parallel transfer workers
    pub transfer_workers: usize,
    /// Verify local existence before reusing a snapshot file
    pub check_exists: bool,
    /// Dataset identifier progress is recorded against
    pub dataset: Option<String>,
    /// Root of the previous snapshot to reuse files from
    pub previous_root: Option<PathBuf>,
    /// Opaque credentials handed to the transport
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            transfer_workers: 4,
            check_exists: true,
            dataset: None,
            previous_root: None,
            credentials: None,
        }
    }
}

/// Report of one completed mirror run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorReport {
    /// Unique identifier of this run
    pub session_id: Uuid,
    /// Files fetched through the transport
    pub downloaded: usize,
    /// Files reused from the previous snapshot
    pub copied: usize,
    pub bytes_downloaded: u64,
    pub bytes_copied: u64,
    pub duration: Duration,
}

/// Drives one run: match, reconcile, then transfer and copy.
pub struct MirrorEngine {
    options: MirrorOptions,
    matcher: PatternMatcher,
    differ: ReuseDiffer,
}

impl MirrorEngine {
    /// Create an engine, compiling the configured patterns
    pub fn new(options: MirrorOptions) -> Result<Self> {
        let matcher = PatternMatcher::new(&options.patterns)?;
        let differ = ReuseDiffer::with_existence_check(options.check_exists);
        Ok(Self {
            options,
            matcher,
            differ,
        })
    }

    pub fn options(&self) -> &MirrorOptions {
        &self.options
    }

    /// Produce the transfer plan for `transport` against an explicit
    /// inventory of files available under `root_dir`.
    pub async fn plan_with_inventory(
        &self,
        transport: &dyn Transport,
        available: Vec<crate::entry::FileEntry>,
        root_dir: &Path,
    ) -> Result<TransferPlan> {
        let listing = transport.list("").await?;
        let mut selection = SyncSelection::new();
        self.matcher
            .match_listing(transport, &listing, &mut selection)
            .await?;
        self.differ.reconcile(&mut selection, available, root_dir);
        Ok(selection.freeze())
    }

    /// Produce the transfer plan for `transport`, scanning the configured
    /// previous snapshot root (if any) for reusable files.
    pub async fn plan(&self, transport: &dyn Transport) -> Result<TransferPlan> {
        match &self.options.previous_root {
            Some(previous) if previous.exists() => {
                let available = snapshot::scan_inventory(previous)?;
                self.plan_with_inventory(transport, available, previous).await
            }
            other => {
                if other.is_some() {
                    debug!("previous snapshot root missing, transferring everything");
                }
                let listing = transport.list("").await?;
                let mut selection = SyncSelection::new();
                self.matcher
                    .match_listing(transport, &listing, &mut selection)
                    .await?;
                Ok(selection.freeze())
            }
        }
    }

    /// Plan and execute one run into `local_dir`.
    ///
    /// Downloads fan out through the transport, bounded by
    /// `transfer_workers`; copies stream from the previous snapshot root.
    /// Each materialized file gets the remote's nominal modification date.
    pub async fn run(
        &self,
        transport: &mut dyn Transport,
        local_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<MirrorReport> {
        let started = Instant::now();
        let session_id = Uuid::new_v4();

        if let Some(credentials) = &self.options.credentials {
            transport.set_credentials(credentials);
        }

        let plan = self.plan(&*transport).await?;
        info!(
            session = %session_id,
            downloads = plan.summary.download_count,
            copies = plan.summary.copy_count,
            "executing transfer plan"
        );

        fs::create_dir_all(local_dir).await?;
        let total = (plan.summary.download_count + plan.summary.copy_count) as u64;
        let applier = TimestampApplier::new();

        let bytes_downloaded = {
            let source: &dyn Transport = &*transport;
            let applier = &applier;
            let workers = self.options.transfer_workers.max(1);
            let outcomes: Vec<Result<u64>> = stream::iter(plan.downloads.iter())
                .map(|file| async move {
                    source
                        .download(std::slice::from_ref(file), local_dir)
                        .await?;
                    applier.apply(file, &join_name(local_dir, &file.name))?;
                    progress.increment(1, total);
                    Ok(file.size)
                })
                .buffer_unordered(workers)
                .collect()
                .await;

            let mut bytes = 0;
            for outcome in outcomes {
                bytes += outcome?;
            }
            bytes
        };

        let mut bytes_copied = 0;
        for file in &plan.copies {
            let source_path = file.local_path().ok_or_else(|| {
                MirrorError::transport(file.name.clone(), "copy entry carries no snapshot root")
            })?;
            let dest = join_name(local_dir, &file.name);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).await?;
            }
            bytes_copied += fs::copy(&source_path, &dest).await?;
            applier.apply(file, &dest)?;
            debug!(name = %file.name, "reused snapshot copy");
            progress.increment(1, total);
        }

        transport.close().await?;

        let report = MirrorReport {
            session_id,
            downloaded: plan.summary.download_count,
            copied: plan.summary.copy_count,
            bytes_downloaded,
            bytes_copied,
            duration: started.elapsed(),
        };
        info!(
            session = %session_id,
            downloaded = report.downloaded,
            copied = report.copied,
            "mirror run complete"
        );
        Ok(report)
    }
}
