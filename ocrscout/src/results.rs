/// Match records and the aggregate that collects them across workers.
///
/// Every worker holds a shared reference to one [`ResultAggregator`]. Appends go
/// through a mutex, so records from different workers never interleave or get
/// lost, but their order reflects completion order rather than the order the
/// images were discovered in:
///
/// ```rust,ignore
/// let aggregator = ResultAggregator::new();
/// rayon::scope(|s| {
///     s.spawn(|_| aggregator.record(MatchRecord::new("a.png", "hello world")));
///     s.spawn(|_| aggregator.record(MatchRecord::new("b.png", "hello again")));
/// });
/// assert_eq!(aggregator.len(), 2);
/// ```
///
/// Once the pool has drained, the dispatcher takes the records out with
/// [`ResultAggregator::into_records`] and persists them with [`write_results`].
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::errors::{ScoutError, ScoutResult};

/// A single line of OCR output that contains the search term
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchRecord {
    /// Base name of the image the line came from
    pub file_name: String,
    /// The matched line as produced by the OCR engine
    pub line: String,
}

impl MatchRecord {
    pub fn new(file_name: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            line: line.into(),
        }
    }

    /// Builds a record tagged with the base name of `path`
    pub fn from_path(path: &Path, line: impl Into<String>) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(file_name, line)
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Found in: {} | Line: {}", self.file_name, self.line)
    }
}

/// Thread-safe, append-only collection of match records
#[derive(Debug, Default)]
pub struct ResultAggregator {
    records: Mutex<Vec<MatchRecord>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MatchRecord>> {
        // A worker that panicked mid-push cannot leave a half-written record
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a record
    pub fn record(&self, record: MatchRecord) {
        self.lock().push(record);
    }

    /// Number of records collected so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Consumes the aggregator, returning the records in append order
    pub fn into_records(self) -> Vec<MatchRecord> {
        self.records
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counters describing how a scan went
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Images discovered and queued
    pub total: usize,
    /// Workers that ran
    pub workers: usize,
    /// Jobs that reached a terminal outcome, successful or abandoned
    pub processed: usize,
    /// Jobs abandoned because preprocessing or extraction failed
    pub failed: usize,
    /// Matching lines found
    pub matches: usize,
}

impl ScanSummary {
    /// Jobs that went through preprocessing, extraction and filtering without error
    pub fn succeeded(&self) -> usize {
        self.processed.saturating_sub(self.failed)
    }
}

/// Outcome of a completed scan
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    /// All matches, in the order workers reported them
    pub records: Vec<MatchRecord>,
    /// Run counters
    pub summary: ScanSummary,
}

impl ScanOutput {
    pub fn has_matches(&self) -> bool {
        !self.records.is_empty()
    }

    /// Renders the records in output-file form, one per line
    pub fn render(&self) -> String {
        self.records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Writes the records to `path`, replacing any existing file.
///
/// Returns `Ok(None)` without touching the filesystem when there is nothing to write.
pub fn write_results(output: &ScanOutput, path: &Path) -> ScoutResult<Option<PathBuf>> {
    if !output.has_matches() {
        return Ok(None);
    }
    fs::write(path, output.render()).map_err(|e| ScoutError::output_write(path, e))?;
    Ok(Some(path.to_path_buf()))
}
