/// The scan pipeline: discovery, the worker pool and the per-image stages.
///
/// A scan is driven by [`scan`], which plays the dispatcher:
///
/// ```rust,ignore
/// let provider = default_provider(&config)?;
/// let output = scan(&config, provider.as_ref(), &NoopSink)?;
/// write_results(&output, &config.output_path)?;
/// ```
///
/// # Stages
///
/// Every worker runs the same sequence for each image it dequeues:
///
/// 1. **Preprocess** ([`ImagePreprocessor`]): in fast mode, images wider than
///    the configured width are downsized into a temporary file; otherwise the
///    path passes through unchanged.
/// 2. **Extract** ([`TextExtractor`]): the worker's leased OCR engine turns the
///    image into text.
/// 3. **Filter** ([`LineMatcher`]): the text is split into lines and every line
///    containing the search term becomes a [`MatchRecord`](crate::results::MatchRecord).
/// 4. **Publish**: records go to the shared
///    [`ResultAggregator`](crate::results::ResultAggregator) and the processed
///    counter is bumped once, whatever the outcome of the job.
///
/// # Concurrency
///
/// Jobs travel over a `crossbeam_channel` queue that is filled and closed by
/// the dispatcher. Workers are rayon tasks pinned one per pool thread; each
/// blocks on the queue until it is both closed and empty. Match records, the
/// counters and the queue are synchronized independently, so no worker ever
/// holds more than one lock at a time.
pub mod engine;
pub mod extractor;
pub mod matcher;
pub mod pool;
pub mod preprocess;

pub use engine::{discover_images, scan};
pub use extractor::{default_provider, EngineProvider, TextExtractor};
pub use matcher::LineMatcher;
pub use pool::{Job, Pipeline, WorkerPool};
pub use preprocess::{ImagePreprocessor, PreparedImage};

#[cfg(feature = "tesseract")]
pub use extractor::TesseractProvider;

#[cfg(not(feature = "tesseract"))]
pub use extractor::UnavailableProvider;
