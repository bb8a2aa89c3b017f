use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, trace};

use crate::metrics::ScanMetrics;
use crate::results::{MatchRecord, ScanSummary};

/// Events emitted while a scan runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Images were enumerated and the pool is about to start
    Discovered {
        root: PathBuf,
        total: usize,
        workers: usize,
    },
    /// A worker found a matching line
    Matched(MatchRecord),
    /// Periodic progress tick
    Progress { processed: usize, total: usize },
    /// A job was abandoned
    Skipped {
        worker: usize,
        path: PathBuf,
        reason: String,
    },
    /// All workers have finished
    Finished(ScanSummary),
}

/// Receives scan events. Called concurrently from every worker and the reporter.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn on_event(&self, _event: ProgressEvent) {}
}

/// Periodically publishes processed/total counts.
///
/// The reporter stops on whichever comes first: the counter reaching the
/// total, or the cancel channel being signalled or disconnected. The
/// dispatcher drops its sender once every worker has returned, so the
/// reporter never outlives the pool even if the counter falls short.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    metrics: ScanMetrics,
    total: usize,
    interval: Duration,
}

impl ProgressReporter {
    pub fn new(metrics: ScanMetrics, total: usize, interval: Duration) -> Self {
        Self {
            metrics,
            total,
            interval,
        }
    }

    /// Runs the reporting loop on the current thread, returning the number of ticks published
    pub fn run(&self, sink: &dyn ProgressSink, cancel: Receiver<()>) -> usize {
        let mut ticks = 0;
        loop {
            match cancel.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => {
                    let processed = self.metrics.processed();
                    sink.on_event(ProgressEvent::Progress {
                        processed,
                        total: self.total,
                    });
                    ticks += 1;
                    trace!("Progress tick {}: {}/{}", ticks, processed, self.total);
                    if processed >= self.total {
                        debug!("Progress reporter saw all {} jobs processed", self.total);
                        return ticks;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug!("Progress reporter cancelled after {} ticks", ticks);
                    return ticks;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn collecting_sink() -> (impl ProgressSink, Arc<Mutex<Vec<ProgressEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink_events = Arc::clone(&events);
        let sink = move |event: ProgressEvent| sink_events.lock().unwrap().push(event);
        (sink, events)
    }

    #[test]
    fn test_stops_when_counter_reaches_total() {
        let metrics = ScanMetrics::new();
        metrics.record_success(0);
        metrics.record_failure();
        let reporter = ProgressReporter::new(metrics, 2, Duration::from_millis(5));
        let (sink, events) = collecting_sink();
        let (_cancel_tx, cancel_rx) = bounded::<()>(0);

        let ticks = reporter.run(&sink, cancel_rx);

        assert_eq!(ticks, 1);
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[ProgressEvent::Progress {
                processed: 2,
                total: 2
            }]
        );
    }

    #[test]
    fn test_cancel_stops_incomplete_run() {
        // Counter never reaches the total, only cancellation ends the loop
        let metrics = ScanMetrics::new();
        let reporter = ProgressReporter::new(metrics, 5, Duration::from_millis(5));
        let (sink, events) = collecting_sink();
        let (cancel_tx, cancel_rx) = bounded::<()>(0);

        let handle = thread::spawn(move || reporter.run(&sink, cancel_rx));
        thread::sleep(Duration::from_millis(40));
        drop(cancel_tx);
        let ticks = handle.join().unwrap();

        assert!(ticks >= 1);
        assert_eq!(events.lock().unwrap().len(), ticks);
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .all(|e| matches!(e, ProgressEvent::Progress { processed: 0, total: 5 })));
    }

    #[test]
    fn test_cancel_before_first_tick() {
        let reporter = ProgressReporter::new(ScanMetrics::new(), 3, Duration::from_secs(60));
        let (sink, events) = collecting_sink();
        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        cancel_tx.send(()).unwrap();

        assert_eq!(reporter.run(&sink, cancel_rx), 0);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_scan_finishes_on_first_tick() {
        let reporter = ProgressReporter::new(ScanMetrics::new(), 0, Duration::from_millis(1));
        let (_cancel_tx, cancel_rx) = bounded::<()>(0);

        assert_eq!(reporter.run(&NoopSink, cancel_rx), 1);
    }
}
