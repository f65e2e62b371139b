//! Fire-and-forget transfer progress counters

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

/// Sink for transfer progress updates.
///
/// `increment` must be cheap and non-blocking: it is called once per
/// transferred file from concurrent workers.
pub trait ProgressSink: Send + Sync {
    /// Record `delta` more files done out of `total`
    fn increment(&self, delta: u64, total: u64);
}

/// Progress counters keyed by an optional dataset identifier.
///
/// When no identifier is configured, recording is a no-op beyond a debug
/// trace: there is nothing to attribute the counters to.
#[derive(Debug, Default)]
pub struct DatasetProgress {
    dataset: Option<String>,
    done: AtomicU64,
    total: AtomicU64,
}

impl DatasetProgress {
    pub fn new(dataset: Option<String>) -> Self {
        Self {
            dataset,
            done: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    pub fn for_dataset(dataset: impl Into<String>) -> Self {
        Self::new(Some(dataset.into()))
    }

    /// Files recorded as done so far
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    /// Last reported total
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl ProgressSink for DatasetProgress {
    fn increment(&self, delta: u64, total: u64) {
        let Some(dataset) = &self.dataset else {
            debug!("dataset not specified, skipping record of transfer progress");
            return;
        };
        let done = self.done.fetch_add(delta, Ordering::Relaxed) + delta;
        self.total.store(total, Ordering::Relaxed);
        debug!(dataset = %dataset, done, total, "transfer progress");
    }
}

/// Sink that discards every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn increment(&self, _delta: u64, _total: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_with_dataset() {
        let progress = DatasetProgress::for_dataset("alu");
        progress.increment(1, 10);
        progress.increment(2, 10);
        assert_eq!(progress.done(), 3);
        assert_eq!(progress.total(), 10);
    }

    #[test]
    fn test_increment_without_dataset_is_noop() {
        let progress = DatasetProgress::new(None);
        progress.increment(5, 10);
        assert_eq!(progress.done(), 0);
        assert_eq!(progress.total(), 0);
    }
}
