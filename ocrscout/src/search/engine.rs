use crossbeam_channel::bounded;
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info, warn};

use super::extractor::EngineProvider;
use super::matcher::LineMatcher;
use super::pool::{Job, Pipeline, WorkerPool};
use super::preprocess::ImagePreprocessor;
use crate::config::ScanConfig;
use crate::errors::{ScoutError, ScoutResult};
use crate::filters::should_include_file;
use crate::metrics::ScanMetrics;
use crate::progress::{ProgressEvent, ProgressReporter, ProgressSink};
use crate::results::{ResultAggregator, ScanOutput, ScanSummary};

/// Lists the images directly inside `root`, sorted by path.
///
/// Subdirectories are not descended into. Failing to read `root` itself is fatal;
/// an individual unreadable entry is logged and skipped.
pub fn discover_images(root: &Path, ignore_patterns: &[String]) -> ScoutResult<Vec<PathBuf>> {
    fs::read_dir(root).map_err(|e| ScoutError::directory_read(root, e))?;

    let mut walker = WalkBuilder::new(root);
    walker
        .max_depth(Some(1))
        .standard_filters(false)
        .follow_links(true);

    let mut images = Vec::new();
    for entry in walker.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry in {}: {}", root.display(), err);
                continue;
            }
        };
        if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if should_include_file(entry.path(), ignore_patterns) {
            images.push(entry.into_path());
        }
    }

    images.sort();
    Ok(images)
}

/// Scans every image in `config.root_path` for lines containing `config.search_term`.
///
/// The images are queued on a channel sized to hold all of them, then a pool of
/// `config.thread_count` workers drains it while a reporter publishes progress
/// every `config.progress_interval`. The call returns once every worker has
/// finished and the reporter has been cancelled. Only directory enumeration
/// errors end the scan early; per-image failures are reported through `sink`
/// and counted in the summary.
pub fn scan(
    config: &ScanConfig,
    provider: &dyn EngineProvider,
    sink: &dyn ProgressSink,
) -> ScoutResult<ScanOutput> {
    config.validate()?;
    let interval = config.progress_interval()?;
    info!(
        "Starting scan of {} for '{}'",
        config.root_path.display(),
        config.search_term
    );

    let images = discover_images(&config.root_path, &config.ignore_patterns)?;
    let total = images.len();
    debug!("Found {} images to process", total);

    let pool = WorkerPool::new(config.thread_count)?;
    let workers = pool.workers();
    sink.on_event(ProgressEvent::Discovered {
        root: config.root_path.clone(),
        total,
        workers,
    });

    let aggregator = ResultAggregator::new();
    let metrics = ScanMetrics::new();
    let pipeline = Pipeline::new(
        LineMatcher::new(config.search_term.as_str()),
        ImagePreprocessor::new(config.fast, config.max_width),
        provider,
        &aggregator,
        &metrics,
        sink,
    );
    let reporter = ProgressReporter::new(metrics.clone(), total, interval);

    // Capacity covers every job, so enqueueing never blocks
    let (job_tx, job_rx) = bounded::<Job>(total.max(1));
    let (cancel_tx, cancel_rx) = bounded::<()>(1);

    thread::scope(|s| {
        let reporter_handle = s.spawn(|| reporter.run(sink, cancel_rx));
        let pool_handle = s.spawn(|| pool.run(job_rx, &pipeline));

        for (id, path) in images.into_iter().enumerate() {
            if job_tx.send(Job::new(id, path)).is_err() {
                warn!("Job queue closed before all images were queued");
                break;
            }
        }
        drop(job_tx);

        let pool_result = pool_handle.join();
        drop(cancel_tx);
        if let Ok(ticks) = reporter_handle.join() {
            debug!("Progress reporter stopped after {} ticks", ticks);
        }
        if let Err(panic) = pool_result {
            std::panic::resume_unwind(panic);
        }
    });

    metrics.log_stats();
    let stats = metrics.get_stats();
    let records = aggregator.into_records();
    let summary = ScanSummary {
        total,
        workers,
        processed: stats.processed,
        failed: stats.failed,
        matches: records.len(),
    };
    sink.on_event(ProgressEvent::Finished(summary));

    info!(
        "Scan complete. Found {} matches in {} images ({} failed)",
        summary.matches, summary.processed, summary.failed
    );

    Ok(ScanOutput { records, summary })
}
