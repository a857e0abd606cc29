//! Summary and percentile statistics over duration samples.
//!
//! Percentiles use the nearest-rank definition with no interpolation: sort
//! ascending, take `sorted[floor(n * p / 100)]` clamped to the last element.
//! This keeps results exactly reproducible across runs and bucket sizes.
//! Standard deviation uses the sample formula (divide by `n - 1`); a
//! single-sample set has a standard deviation of `0` by definition here.

use crate::error::{ReportError, Result};
use serde::ser::Serializer;
use serde::Serialize;

/// A single statistic field that may be unavailable (for example in an
/// interval that received no samples). Serializes as a JSON number or `null`,
/// never as a sentinel string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stat {
    Available(f64),
    NotAvailable,
}

impl Stat {
    /// Returns the value if available.
    pub fn value(&self) -> Option<f64> {
        match self {
            Stat::Available(v) => Some(*v),
            Stat::NotAvailable => None,
        }
    }
}

impl From<f64> for Stat {
    fn from(v: f64) -> Self {
        Stat::Available(v)
    }
}

impl Serialize for Stat {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Stat::Available(v) => serializer.serialize_f64(*v),
            Stat::NotAvailable => serializer.serialize_none(),
        }
    }
}

/// Summary statistics over a non-empty set of duration samples.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub stdev: f64,
    pub pct_25: f64,
    pub pct_50: f64,
    pub pct_80: f64,
    pub pct_90: f64,
    pub pct_95: f64,
}

impl SummaryStats {
    /// Compute summary statistics over a set of duration samples.
    ///
    /// Fails with [`ReportError::EmptySeries`] on empty input; callers that
    /// know which timer the samples came from attach that context when
    /// logging.
    pub fn from_durations(durations: &[f64]) -> Result<Self> {
        if durations.is_empty() {
            return Err(ReportError::EmptySeries);
        }

        let mut sorted = durations.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("duration samples must not be NaN"));

        Ok(Self {
            count: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            avg: mean(&sorted),
            stdev: sample_stdev(&sorted),
            pct_25: percentile(&sorted, 25.0),
            pct_50: percentile(&sorted, 50.0),
            pct_80: percentile(&sorted, 80.0),
            pct_90: percentile(&sorted, 90.0),
            pct_95: percentile(&sorted, 95.0),
        })
    }
}

/// Arithmetic mean of a non-empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1). Defined as `0` for a single sample.
pub fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Nearest-rank percentile over an ascending-sorted, non-empty slice.
///
/// `index = floor(n * p / 100)`, clamped to the last element. No
/// interpolation is performed, so the result is always an observed sample.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let index = (sorted.len() as f64 * pct / 100.0).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}
