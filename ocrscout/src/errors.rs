/// Error types for ocrscout.
///
/// Errors fall into two groups, and the split decides how far an error travels:
///
/// 1. **Fatal, run-level errors**
///    Failing to read the scanned directory or failing to persist the results.
///    These are propagated out of [`crate::search::scan`] and end the run.
///
/// 2. **Per-job errors**
///    Anything that goes wrong while preparing or reading a single image
///    (unsupported format, decode failure, OCR engine error). A worker logs
///    these together with its id and the image path, abandons the job and
///    moves on. They never cross a worker boundary.
///
/// ```rust,ignore
/// match scan(&config, &provider, &sink) {
///     Ok(output) => // Persist and report,
///     Err(e) if e.is_fatal() => // Exit with a diagnostic,
///     Err(e) => // Configuration or thread pool problem
/// }
/// ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations
pub type ScoutResult<T> = Result<T, ScoutError>;

/// Errors that can occur while scanning images
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write results to {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Unsupported image format in {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },
    #[error("Failed to write resized image for {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to initialize OCR engine: {0}")]
    EngineInit(String),
    #[error("Text extraction failed for {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScoutError {
    pub fn directory_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryRead {
            path: path.into(),
            source,
        }
    }

    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }

    pub fn image_decode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::ImageDecode {
            path: path.into(),
            source,
        }
    }

    pub fn unsupported_format(path: impl Into<PathBuf>, format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            format: format.into(),
        }
    }

    pub fn image_write(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::ImageWrite {
            path: path.into(),
            source,
        }
    }

    pub fn engine_init(msg: impl Into<String>) -> Self {
        Self::EngineInit(msg.into())
    }

    pub fn extraction(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether this error ends the whole run rather than a single job
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DirectoryRead { .. } | Self::OutputWrite { .. }
        )
    }
}
