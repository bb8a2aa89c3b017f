use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Tracks per-job outcomes across all workers
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    // Terminal job outcomes
    processed: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,

    // Work done inside successful jobs
    matches: Arc<AtomicUsize>,
    resized: Arc<AtomicUsize>,
}

impl ScanMetrics {
    /// Creates a new ScanMetrics instance
    pub fn new() -> Self {
        Self {
            processed: Arc::new(AtomicUsize::new(0)),
            failed: Arc::new(AtomicUsize::new(0)),
            matches: Arc::new(AtomicUsize::new(0)),
            resized: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Records a job that ran to completion, returning the new processed count
    pub fn record_success(&self, matches: usize) -> usize {
        self.matches.fetch_add(matches, Ordering::Relaxed);
        let processed = self.processed.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("Job done with {} matches, processed: {}", matches, processed);
        processed
    }

    /// Records an abandoned job, returning the new processed count
    pub fn record_failure(&self) -> usize {
        self.failed.fetch_add(1, Ordering::Relaxed);
        let processed = self.processed.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("Job abandoned, processed: {}", processed);
        processed
    }

    /// Records an image that fast mode downsized
    pub fn record_resize(&self) {
        self.resized.fetch_add(1, Ordering::Relaxed);
    }

    /// Jobs that reached a terminal outcome so far
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Acquire)
    }

    /// Gets a snapshot of the counters
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            processed: self.processed.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
            resized: self.resized.load(Ordering::Relaxed),
        }
    }

    /// Logs the counters
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Jobs processed: {}\n\
             Jobs abandoned: {}\n\
             Matching lines: {}\n\
             Images resized: {}",
            stats.processed, stats.failed, stats.matches, stats.resized
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub processed: usize,
    pub failed: usize,
    pub matches: usize,
    pub resized: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_outcome_tracking() {
        let metrics = ScanMetrics::new();

        assert_eq!(metrics.record_success(0), 1);
        assert_eq!(metrics.record_success(3), 2);
        assert_eq!(metrics.record_failure(), 3);
        metrics.record_resize();

        let stats = metrics.get_stats();
        assert_eq!(stats.processed, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.matches, 3);
        assert_eq!(stats.resized, 1);
    }

    #[test]
    fn test_zero_match_job_counts_once() {
        let metrics = ScanMetrics::new();
        metrics.record_success(0);

        let stats = metrics.get_stats();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.matches, 0);
        assert_eq!(stats.failed, 0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = ScanMetrics::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        metrics.record_success(1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.processed(), 400);
        assert_eq!(metrics.get_stats().matches, 400);
    }
}
