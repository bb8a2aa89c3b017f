mod console;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use ocrscout::{
    config::{default_thread_count, ScanConfig, DEFAULT_MAX_WIDTH},
    search::{default_provider, scan},
    write_results,
};
use std::ffi::OsString;
use std::io;
use std::{num::NonZeroUsize, path::PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use console::{print_summary, ConsoleSink};

/// Long flags that may also be written with a single dash, e.g. `-search foo`
const LONG_FLAGS: &[&str] = &[
    "search",
    "path",
    "out",
    "fast",
    "help",
    "version",
    "threads",
    "interval",
    "lang",
    "tessdata",
    "max-width",
    "ignore",
    "config",
    "log-level",
];

/// Flags that never take a value
const SWITCHES: &[&str] = &["fast", "help", "version", "f", "h", "V"];

#[derive(Parser, Debug)]
#[command(name = "ocrscout", author, version, about, long_about = None)]
struct Cli {
    /// The string to search for in OCR-extracted text (required)
    #[arg(short = 's', long, allow_hyphen_values = true)]
    search: Option<String>,

    /// Path to the folder containing images
    #[arg(short = 'p', long, default_value = ".", allow_hyphen_values = true)]
    path: PathBuf,

    /// File to save matching results
    #[arg(short = 'o', long, default_value = "results.txt", allow_hyphen_values = true)]
    out: PathBuf,

    /// Enable fast mode (resize large images to --max-width before OCR)
    #[arg(short = 'f', long)]
    fast: bool,

    /// Width images are resized to in fast mode
    #[arg(long, default_value_t = DEFAULT_MAX_WIDTH)]
    max_width: u32,

    /// Number of OCR workers (default: CPU cores)
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Interval between progress lines (e.g. 10s, 500ms)
    #[arg(long, default_value = "10s", value_parser = parse_interval)]
    interval: String,

    /// Tesseract language
    #[arg(long, default_value = "eng")]
    lang: String,

    /// Directory containing tesseract language data
    #[arg(long)]
    tessdata: Option<PathBuf>,

    /// File patterns to skip (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn into_scan_config(self) -> ScanConfig {
        ScanConfig {
            search_term: self.search.unwrap_or_default(),
            root_path: self.path,
            output_path: self.out,
            fast: self.fast,
            max_width: self.max_width,
            thread_count: self.threads.unwrap_or_else(default_thread_count),
            progress_interval: self.interval,
            language: self.lang,
            tessdata_dir: self.tessdata,
            ignore_patterns: self.ignore,
            log_level: self.log_level,
        }
    }
}

fn parse_interval(value: &str) -> std::result::Result<String, String> {
    humantime::parse_duration(value)
        .map(|_| value.to_string())
        .map_err(|e| format!("invalid interval '{}': {}", value, e))
}

/// Rewrites single-dash long flags (`-search`) to their double-dash form.
///
/// The argument following a flag that takes a value is passed through as is,
/// so `-search -fast` looks for the text "-fast".
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut value_pending = false;
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || std::mem::take(&mut value_pending) {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(flag) = text.strip_prefix('-') else {
                return arg;
            };
            let (double_dash, flag) = match flag.strip_prefix('-') {
                Some(flag) => (true, flag),
                None => (false, flag),
            };
            let (name, inline_value) = match flag.split_once('=') {
                Some((name, _)) => (name, true),
                None => (flag, false),
            };

            let is_long = LONG_FLAGS.contains(&name);
            let is_short = !double_dash && name.chars().count() == 1;
            value_pending = (is_long || is_short) && !inline_value && !SWITCHES.contains(&name);

            if is_long && !double_dash {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}

/// Combines the config files with the flags.
///
/// Returns `None` when no search term was given anywhere, in which case the
/// usage text is shown. A config file that fails to load only matters once
/// there is a term to search for.
fn resolve_config(cli: Cli) -> Result<Option<ScanConfig>> {
    let term_given = cli.search.as_deref().is_some_and(|term| !term.is_empty());
    let file_config = match ScanConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(_) if !term_given => return Ok(None),
        Err(e) => return Err(e).context("Failed to load configuration"),
    };

    let threads = cli.threads;
    let config = file_config
        .merge_with_cli(cli.into_scan_config())
        .with_thread_count(threads);

    if config.search_term.is_empty() {
        return Ok(None);
    }
    Ok(Some(config))
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let Some(config) = resolve_config(cli)? else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    init_logging(&config.log_level);
    debug!("Effective configuration: {:?}", config);

    let provider = default_provider(&config)?;
    let output = scan(&config, provider.as_ref(), &ConsoleSink)?;
    let saved_to = write_results(&output, &config.output_path)?;
    print_summary(&mut io::stdout().lock(), &output.summary, saved_to.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(args: &[&str]) -> Vec<String> {
        normalize_args(args.iter().map(OsString::from))
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_normalize_single_dash_flags() {
        assert_eq!(
            normalized(&["ocrscout", "-search", "hello", "-path", "scans", "-fast"]),
            vec!["ocrscout", "--search", "hello", "--path", "scans", "--fast"]
        );
        assert_eq!(
            normalized(&["ocrscout", "-out=found.txt", "-help"]),
            vec!["ocrscout", "--out=found.txt", "--help"]
        );
    }

    #[test]
    fn test_normalize_leaves_other_args() {
        assert_eq!(
            normalized(&["ocrscout", "-s", "hello", "--path", "scans", "-j", "2"]),
            vec!["ocrscout", "-s", "hello", "--path", "scans", "-j", "2"]
        );
        // Values that merely look like flags are untouched
        assert_eq!(
            normalized(&["ocrscout", "--search", "-total", "-"]),
            vec!["ocrscout", "--search", "-total", "-"]
        );
    }

    #[test]
    fn test_normalize_keeps_flag_values() {
        assert_eq!(
            normalized(&["ocrscout", "-search", "-fast", "-path", "-scans", "-fast"]),
            vec!["ocrscout", "--search", "-fast", "--path", "-scans", "--fast"]
        );
        assert_eq!(
            normalized(&["ocrscout", "-s", "-out", "-search=x", "-o", "-help"]),
            vec!["ocrscout", "-s", "-out", "--search=x", "-o", "-help"]
        );
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(normalize_args(args.iter().map(OsString::from))).unwrap()
    }

    #[test]
    fn test_hyphen_leading_values_parse() {
        assert_eq!(parse(&["ocrscout", "--search", "-total"]).search.as_deref(), Some("-total"));
        assert_eq!(parse(&["ocrscout", "-search", "-5"]).search.as_deref(), Some("-5"));

        let cli = parse(&["ocrscout", "-search", "-fast", "-path", "-scans", "-out", "-r.txt"]);
        assert_eq!(cli.search.as_deref(), Some("-fast"));
        assert!(!cli.fast);
        assert_eq!(cli.path, PathBuf::from("-scans"));
        assert_eq!(cli.out, PathBuf::from("-r.txt"));
    }

    #[test]
    fn test_explicit_threads_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let cpus = default_thread_count().get();
        let config_path = dir.path().join("ocrscout.yaml");
        std::fs::write(&config_path, format!("thread_count: {}\n", cpus + 1)).unwrap();
        let config_arg = config_path.to_str().unwrap();

        let cpus_arg = cpus.to_string();
        let cli = parse(&["ocrscout", "-s", "x", "-c", config_arg, "-j", &cpus_arg]);
        let config = resolve_config(cli).unwrap().unwrap();
        assert_eq!(config.thread_count.get(), cpus);

        let cli = parse(&["ocrscout", "-s", "x", "-c", config_arg]);
        let config = resolve_config(cli).unwrap().unwrap();
        assert_eq!(config.thread_count.get(), cpus + 1);
    }

    #[test]
    fn test_broken_config_without_term_shows_usage() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bad.yaml");
        std::fs::write(&config_path, "max_width: \"wide\"\n").unwrap();
        let config_arg = config_path.to_str().unwrap();

        let cli = parse(&["ocrscout", "-c", config_arg]);
        assert!(resolve_config(cli).unwrap().is_none());

        let cli = parse(&["ocrscout", "-s", "x", "-c", config_arg]);
        assert!(resolve_config(cli).is_err());
    }

    #[test]
    fn test_cli_into_scan_config() {
        let cli = Cli::parse_from(normalize_args(
            ["ocrscout", "-search", "hello", "-path", "scans", "-fast", "-j", "3"]
                .iter()
                .map(OsString::from),
        ));
        let config = cli.into_scan_config();

        assert_eq!(config.search_term, "hello");
        assert_eq!(config.root_path, PathBuf::from("scans"));
        assert_eq!(config.output_path, PathBuf::from("results.txt"));
        assert!(config.fast);
        assert_eq!(config.thread_count, NonZeroUsize::new(3).unwrap());
        assert_eq!(config.max_width, DEFAULT_MAX_WIDTH);
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let result = Cli::try_parse_from(["ocrscout", "--search", "x", "--interval", "often"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
