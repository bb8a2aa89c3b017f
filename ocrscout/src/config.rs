use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ScoutError, ScoutResult};

/// Width in pixels above which fast mode downsizes an image before OCR
pub const DEFAULT_MAX_WIDTH: u32 = 1200;

/// Configuration for a scan over a directory of images.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.ocrscout.yaml` in the current directory
/// 3. Global `$HOME/.config/ocrscout/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Literal, case-sensitive text to look for
/// search_term: "invoice"
///
/// # Directory holding the images (not searched recursively)
/// root_path: "./scans"
///
/// # Where matching lines are written
/// output_path: "results.txt"
///
/// # Downsize images wider than max_width before OCR
/// fast: true
/// max_width: 1200
///
/// # Worker count (default: CPU cores)
/// thread_count: 4
///
/// # How often progress is printed
/// progress_interval: "10s"
///
/// # Tesseract language and optional tessdata directory
/// language: "eng"
/// tessdata_dir: "/usr/share/tesseract-ocr/5/tessdata"
///
/// # File names to skip (glob syntax)
/// ignore_patterns:
///   - "**/thumb_*"
///
/// log_level: "info"
/// ```
///
/// Command-line arguments take precedence over config file values, see
/// [`ScanConfig::merge_with_cli`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Text that must occur in an OCR line for it to count as a match
    #[serde(default)]
    pub search_term: String,

    /// Directory to scan for images
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// File the matching lines are written to
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Enables downsizing of oversized images before OCR
    #[serde(default)]
    pub fast: bool,

    /// Target width for fast mode
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    /// Number of OCR workers
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Interval between progress lines, in humantime syntax ("10s", "500ms")
    #[serde(default = "default_progress_interval")]
    pub progress_interval: String,

    /// Tesseract language code
    #[serde(default = "default_language")]
    pub language: String,

    /// Directory containing tesseract language data
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,

    /// Patterns to ignore (supports glob syntax)
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("results.txt")
}

fn default_max_width() -> u32 {
    DEFAULT_MAX_WIDTH
}

pub fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_progress_interval() -> String {
    "10s".to_string()
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            root_path: default_root_path(),
            output_path: default_output_path(),
            fast: false,
            max_width: default_max_width(),
            thread_count: default_thread_count(),
            progress_interval: default_progress_interval(),
            language: default_language(),
            tessdata_dir: None,
            ignore_patterns: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl ScanConfig {
    /// Creates a configuration with defaults for everything but the search term
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("ocrscout/config.yaml")),
            Some(PathBuf::from(".ocrscout.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// `thread_count` is left alone: its CLI default is indistinguishable from
    /// an explicit value, so callers apply it with [`ScanConfig::with_thread_count`].
    pub fn merge_with_cli(mut self, cli_config: ScanConfig) -> Self {
        // CLI values take precedence when they differ from the defaults
        if !cli_config.search_term.is_empty() {
            self.search_term = cli_config.search_term;
        }
        if cli_config.root_path != default_root_path() {
            self.root_path = cli_config.root_path;
        }
        if cli_config.output_path != default_output_path() {
            self.output_path = cli_config.output_path;
        }
        if cli_config.fast {
            self.fast = true;
        }
        if cli_config.max_width != default_max_width() {
            self.max_width = cli_config.max_width;
        }
        if cli_config.progress_interval != default_progress_interval() {
            self.progress_interval = cli_config.progress_interval;
        }
        if cli_config.language != default_language() {
            self.language = cli_config.language;
        }
        if cli_config.tessdata_dir.is_some() {
            self.tessdata_dir = cli_config.tessdata_dir;
        }
        if !cli_config.ignore_patterns.is_empty() {
            self.ignore_patterns = cli_config.ignore_patterns;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }

    /// Overrides the worker count when one was given explicitly
    pub fn with_thread_count(mut self, thread_count: Option<NonZeroUsize>) -> Self {
        if let Some(thread_count) = thread_count {
            self.thread_count = thread_count;
        }
        self
    }

    /// Parsed progress interval
    pub fn progress_interval(&self) -> ScoutResult<Duration> {
        let interval = humantime::parse_duration(&self.progress_interval).map_err(|e| {
            ScoutError::config_error(format!(
                "invalid progress interval '{}': {}",
                self.progress_interval, e
            ))
        })?;
        if interval.is_zero() {
            return Err(ScoutError::config_error(
                "progress interval must be greater than zero",
            ));
        }
        Ok(interval)
    }

    /// Checks values that serde cannot check on its own
    pub fn validate(&self) -> ScoutResult<()> {
        if self.search_term.is_empty() {
            return Err(ScoutError::config_error("search term must not be empty"));
        }
        if self.max_width == 0 {
            return Err(ScoutError::config_error("max width must be greater than zero"));
        }
        self.progress_interval()?;
        Ok(())
    }
}
