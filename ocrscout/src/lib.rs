pub mod config;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod progress;
pub mod results;
pub mod search;

pub use config::ScanConfig;
pub use errors::{ScoutError, ScoutResult};
pub use progress::{NoopSink, ProgressEvent, ProgressSink};
pub use results::{write_results, MatchRecord, ScanOutput, ScanSummary};
pub use search::{scan, EngineProvider, TextExtractor};
