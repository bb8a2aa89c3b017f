use crossbeam_channel::Receiver;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::{debug, trace, warn};

use super::extractor::{EngineProvider, TextExtractor};
use super::matcher::LineMatcher;
use super::preprocess::ImagePreprocessor;
use crate::errors::ScoutResult;
use crate::metrics::ScanMetrics;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::results::{MatchRecord, ResultAggregator};

/// One image waiting to be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Position in discovery order
    pub id: usize,
    pub path: PathBuf,
}

impl Job {
    pub fn new(id: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }
}

/// Everything a worker needs to turn a job into match records
pub struct Pipeline<'a> {
    matcher: LineMatcher,
    preprocessor: ImagePreprocessor,
    provider: &'a dyn EngineProvider,
    aggregator: &'a ResultAggregator,
    metrics: &'a ScanMetrics,
    sink: &'a dyn ProgressSink,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        matcher: LineMatcher,
        preprocessor: ImagePreprocessor,
        provider: &'a dyn EngineProvider,
        aggregator: &'a ResultAggregator,
        metrics: &'a ScanMetrics,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            matcher,
            preprocessor,
            provider,
            aggregator,
            metrics,
            sink,
        }
    }

    /// Worker body: drains `jobs` until the queue is closed and empty
    fn work(&self, worker: usize, jobs: Receiver<Job>) {
        let mut lease = EngineLease::new(worker, self.provider);
        debug!("Worker {} started", worker);

        // Blocks while the queue is open and empty, ends once it is closed and drained
        for job in jobs.iter() {
            trace!("Worker {} picked job {} ({})", worker, job.id, job.path.display());
            match self.process(&job, &mut lease) {
                Ok(matches) => {
                    self.metrics.record_success(matches);
                }
                Err(e) => {
                    warn!(
                        "[Worker {}] Failed to process {}: {}",
                        worker,
                        job.path.display(),
                        e
                    );
                    self.sink.on_event(ProgressEvent::Skipped {
                        worker,
                        path: job.path.clone(),
                        reason: e.to_string(),
                    });
                    self.metrics.record_failure();
                }
            }
        }

        debug!("Worker {} found the queue closed, exiting", worker);
    }

    /// Preprocess, extract, filter and publish. Returns the number of matches.
    fn process(&self, job: &Job, lease: &mut EngineLease<'_>) -> ScoutResult<usize> {
        let prepared = self.preprocessor.prepare(&job.path)?;
        if prepared.is_resized() {
            self.metrics.record_resize();
        }

        let text = lease.engine()?.extract_text(prepared.path())?;

        let mut matches = 0;
        for line in self.matcher.matching_lines(&text) {
            let record = MatchRecord::from_path(&job.path, line);
            self.sink.on_event(ProgressEvent::Matched(record.clone()));
            self.aggregator.record(record);
            matches += 1;
        }
        Ok(matches)
    }
}

/// A worker's OCR engine handle.
///
/// Acquired on the first job that needs it and released when the worker
/// returns or unwinds.
struct EngineLease<'p> {
    worker: usize,
    provider: &'p dyn EngineProvider,
    engine: Option<Box<dyn TextExtractor>>,
}

impl<'p> EngineLease<'p> {
    fn new(worker: usize, provider: &'p dyn EngineProvider) -> Self {
        Self {
            worker,
            provider,
            engine: None,
        }
    }

    fn engine(&mut self) -> ScoutResult<&mut Box<dyn TextExtractor>> {
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => {
                let engine = self.provider.lease()?;
                trace!("Worker {} leased an OCR engine", self.worker);
                engine
            }
        };
        Ok(self.engine.insert(engine))
    }
}

impl Drop for EngineLease<'_> {
    fn drop(&mut self) {
        if self.engine.take().is_some() {
            trace!("Worker {} released its OCR engine", self.worker);
        }
    }
}

/// Fixed-size pool of OCR workers
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Builds a pool with exactly `workers` threads
    pub fn new(workers: NonZeroUsize) -> ScoutResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|i| format!("ocr-worker-{}", i))
            .build()?;
        Ok(Self {
            pool,
            workers: workers.get(),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs one worker per pool thread against the shared queue and blocks until all of them return.
    ///
    /// Each worker occupies its thread for the whole run, so the number of
    /// spawned workers must not exceed the thread count.
    pub fn run(&self, jobs: Receiver<Job>, pipeline: &Pipeline<'_>) {
        self.pool.scope(|scope| {
            for worker in 0..self.workers {
                let jobs = jobs.clone();
                scope.spawn(move |_| pipeline.work(worker, jobs));
            }
        });
        debug!("All {} workers finished", self.workers);
    }
}
