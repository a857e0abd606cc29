//! # Load Test Report
//!
//! Offline aggregation of per-request latency measurements recorded during a
//! load test. The library ingests a CSV result log, normalizes heterogeneous
//! custom-timer value shapes into canonical time-series samples, partitions
//! samples into fixed-width time buckets, computes summary and percentile
//! statistics per timer and per bucket, and assembles per-timer report
//! structures for external rendering collaborators.
//!
//! ## Pipeline
//!
//! 1. `loader`: parse the result log into a read-only [`Dataset`]
//! 2. `timer`: normalize each record's raw timer values into canonical
//!    `(offset, duration)` samples
//! 3. `bucket`: partition samples into gap-free fixed-width buckets and
//!    zero-anchored throughput bins
//! 4. `stats`: nearest-rank percentiles and summary statistics, whole-series
//!    and per-bucket
//! 5. `report`: merge everything into per-timer output structures, fanned
//!    out across cores with rayon
//!
//! Chart rendering and report templating sit behind traits in `render`; the
//! engine depends only on the series and data-dictionary contracts.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use loadtest_report::{Dataset, ReportAssembler, ReportConfig};
//! use loadtest_report::cli::PairTimestampMode;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ReportConfig {
//!         run_time_limit: 300.0,
//!         interval_width: 10.0,
//!         rampup: 60.0,
//!         output_dir: "./results".into(),
//!         pair_timestamps: PairTimestampMode::Absolute,
//!         sequential: false,
//!     };
//!     let dataset = Dataset::from_csv("results.csv", config.run_time_limit)?;
//!     let report = ReportAssembler::new(&dataset, &config).assemble()?;
//!     println!("transactions: {}", report.data.total_transactions);
//!     Ok(())
//! }
//! ```

/// Result log parsing and the read-only dataset with run-wide aggregates.
pub mod loader;

/// Timer value normalization: the three raw value shapes and the canonical
/// sample series.
pub mod timer;

/// Fixed-width time bucketing and throughput binning.
pub mod bucket;

/// Summary and nearest-rank percentile statistics.
pub mod stats;

/// Per-timer report assembly and the templating data dictionary.
pub mod report;

/// Rendering collaborator traits and the shipped JSON/no-op implementations.
pub mod render;

/// Command-line interface and report configuration.
pub mod cli;

pub mod error;

// Re-export the primary types for convenient library usage.
pub use bucket::{bucketize, throughput, Bucket};
pub use cli::{Args, ReportConfig};
pub use error::{ReportError, Result};
pub use loader::{Dataset, ResponseRecord};
pub use render::{ChartRenderer, RenderContext, TemplateEngine};
pub use report::{AssembledReport, ReportAssembler, ReportData, TimerReport};
pub use stats::{SummaryStats, Stat};
pub use timer::{normalize_timer, RawTimerValue, TimerSample, TimerSeries};

/// The current version of the report engine, used in log output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values.
pub mod defaults {
    /// Default time-series interval width in seconds. Ten seconds keeps
    /// per-interval sample counts meaningful for typical run lengths while
    /// still showing ramp-up and saturation trends.
    pub const INTERVAL_WIDTH: f64 = 10.0;

    /// Default output directory for the report document and chart images.
    pub const OUTPUT_DIR: &str = "./";

    /// Default file name for the JSON report artifact.
    pub const REPORT_FILE: &str = "results.json";
}
