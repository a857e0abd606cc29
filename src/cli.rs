use crate::error::{ReportError, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Load Test Report - aggregate a load-test result log into summary,
/// per-interval, and throughput reports
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// Path to the result log (CSV, one row per request)
    pub results_file: PathBuf,

    /// Run time limit in seconds; records at or past this elapsed time are
    /// dropped from the retained dataset
    #[clap(short = 'r', long)]
    pub run_time: f64,

    /// Width of each time-series interval, in seconds
    #[clap(short = 'i', long, default_value_t = crate::defaults::INTERVAL_WIDTH)]
    pub interval: f64,

    /// Ramp-up time in seconds, echoed into the report
    #[clap(long, default_value_t = 0.0)]
    pub rampup: f64,

    /// Directory for the report document and chart images
    #[clap(short = 'o', long, default_value = crate::defaults::OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Timestamp convention for pair-shaped timer values
    #[clap(long, value_enum, default_value_t = PairTimestampMode::Absolute)]
    pub pair_timestamps: PairTimestampMode,

    /// Process timers one at a time instead of fanning out across cores
    #[clap(long, default_value_t = false)]
    pub sequential: bool,
}

/// How the timestamp in a `(timestamp, duration)` timer pair is interpreted.
///
/// Some result sources store pair timestamps as absolute epoch seconds,
/// others as run-relative offsets. The convention is an explicit
/// configuration choice, never guessed per input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum PairTimestampMode {
    /// Timestamps are absolute epoch seconds and are converted to
    /// run-relative offsets (`offset = timestamp - run_start_epoch`).
    #[clap(name = "absolute")]
    Absolute,

    /// Timestamps are already relative to run start and pass through as-is.
    #[clap(name = "relative")]
    Relative,
}

impl std::fmt::Display for PairTimestampMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairTimestampMode::Absolute => write!(f, "absolute"),
            PairTimestampMode::Relative => write!(f, "relative"),
        }
    }
}

/// Configuration for one report run.
#[derive(Clone, Debug, Serialize)]
pub struct ReportConfig {
    pub run_time_limit: f64,
    pub interval_width: f64,
    pub rampup: f64,
    pub output_dir: PathBuf,
    pub pair_timestamps: PairTimestampMode,
    pub sequential: bool,
}

impl ReportConfig {
    /// Validate configuration values before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.interval_width <= 0.0 {
            return Err(ReportError::InvalidInterval {
                interval: self.interval_width,
            });
        }
        if self.run_time_limit <= 0.0 {
            return Err(ReportError::InvalidInterval {
                interval: self.run_time_limit,
            });
        }
        Ok(())
    }
}

impl From<&Args> for ReportConfig {
    fn from(args: &Args) -> Self {
        Self {
            run_time_limit: args.run_time,
            interval_width: args.interval,
            rampup: args.rampup,
            output_dir: args.output_dir.clone(),
            pair_timestamps: args.pair_timestamps,
            sequential: args.sequential,
        }
    }
}
