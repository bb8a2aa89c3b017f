use colored::Colorize;
use ocrscout::{ProgressEvent, ProgressSink, ScanSummary};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Prints scan events to stdout as they happen
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn on_event(&self, event: ProgressEvent) {
        // One locked write per event keeps lines from different workers whole
        if let Err(e) = render_event(&mut io::stdout().lock(), &event) {
            debug!("Failed to write event to stdout: {}", e);
        }
    }
}

/// Writes the console line(s) for `event`, if it has any
fn render_event(out: &mut impl Write, event: &ProgressEvent) -> io::Result<()> {
    match event {
        ProgressEvent::Discovered {
            root,
            total,
            workers,
        } => writeln!(
            out,
            "Found {} image(s) in '{}'\nUsing {} workers",
            total,
            root.display(),
            workers
        ),
        ProgressEvent::Matched(record) => writeln!(out, "{}", record),
        ProgressEvent::Progress { processed, total } => {
            writeln!(out, "Progress: {}/{} images processed", processed, total)
        }
        // Skips are logged by the worker, the summary covers the rest
        ProgressEvent::Skipped { .. } | ProgressEvent::Finished(_) => Ok(()),
    }
}

/// Prints the closing lines of a run
pub fn print_summary(
    out: &mut impl Write,
    summary: &ScanSummary,
    saved_to: Option<&Path>,
) -> io::Result<()> {
    if summary.failed > 0 {
        writeln!(
            out,
            "{}",
            format!(
                "{} of {} image(s) could not be processed",
                summary.failed, summary.total
            )
            .yellow()
        )?;
    }

    match saved_to {
        Some(path) => writeln!(out, "Results saved to: {}", path.display()),
        None => writeln!(out, "No matches found."),
    }
}
