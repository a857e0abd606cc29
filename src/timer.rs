//! Timer value normalization.
//!
//! A custom timer value in the result log has exactly three admissible JSON
//! shapes, disambiguated structurally at ingestion time by serde rather than
//! probed repeatedly at runtime:
//!
//! - a scalar duration: `1.5`
//! - a list of durations: `[1.5, 0.2]`
//! - a list of `(timestamp, duration)` pairs: `[[1289400123.2, 1.5], ...]`
//!
//! Normalization flattens every record's entry for one timer name into a
//! [`TimerSeries`] of canonical `(offset, duration)` samples, with offsets
//! always relative to run start. Pair timestamps are treated as absolute
//! epoch seconds and converted by default; [`PairTimestampMode::Relative`]
//! selects the run-relative convention instead. The convention is a
//! crate-level configuration choice and is never guessed per input.

use crate::cli::PairTimestampMode;
use crate::loader::Dataset;
use serde::{Deserialize, Serialize};

/// Name of the synthetic timer populated from every record's
/// `transaction_time`. It participates in reporting like any custom timer but
/// bypasses the three-way shape dispatch.
pub const TRANSACTIONS_TIMER: &str = "Transactions";

/// A raw custom-timer value as it appears in the result log.
///
/// Deserialized untagged: the shape is classified exactly once per
/// `(record, timer)` when the log is parsed, and carried forward as this
/// enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimerValue {
    /// A single duration, observed at the record's elapsed time.
    Scalar(f64),
    /// Several durations, all observed at the record's elapsed time.
    Durations(Vec<f64>),
    /// Timestamped durations; the timestamp convention is selected by
    /// [`PairTimestampMode`].
    Pairs(Vec<(f64, f64)>),
}

/// One canonical timer sample: run-relative offset and duration, both in
/// seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimerSample {
    pub offset_secs: f64,
    pub duration_secs: f64,
}

/// All samples gathered for one timer name, in record ingestion order.
/// Not necessarily time-sorted until bucketed.
#[derive(Debug, Clone, Default)]
pub struct TimerSeries {
    pub samples: Vec<TimerSample>,
}

impl TimerSeries {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Smallest offset in the series, or `None` when empty.
    pub fn min_offset(&self) -> Option<f64> {
        self.samples
            .iter()
            .map(|s| s.offset_secs)
            .fold(None, |acc, o| Some(acc.map_or(o, |m: f64| m.min(o))))
    }

    /// Duration values in sample order.
    pub fn durations(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.duration_secs).collect()
    }
}

/// Gather every record's entry for `timer_name` into a flat [`TimerSeries`].
///
/// Records without an entry for the timer are skipped silently; most timers
/// are sparse and this is the expected case, not an error. The returned
/// series may be empty, which downstream statistics surface as an error.
pub fn normalize_timer(
    dataset: &Dataset,
    timer_name: &str,
    pair_mode: PairTimestampMode,
) -> TimerSeries {
    let mut series = TimerSeries::default();

    if timer_name == TRANSACTIONS_TIMER {
        // Synthetic timer: one scalar per record from transaction_time.
        for record in dataset.records() {
            series.samples.push(TimerSample {
                offset_secs: record.elapsed_time,
                duration_secs: record.transaction_time,
            });
        }
        return series;
    }

    for record in dataset.records() {
        let Some(value) = record.custom_timers.get(timer_name) else {
            continue;
        };
        match value {
            RawTimerValue::Scalar(duration) => series.samples.push(TimerSample {
                offset_secs: record.elapsed_time,
                duration_secs: *duration,
            }),
            RawTimerValue::Durations(durations) => {
                for &duration in durations {
                    series.samples.push(TimerSample {
                        offset_secs: record.elapsed_time,
                        duration_secs: duration,
                    });
                }
            }
            RawTimerValue::Pairs(pairs) => {
                for &(timestamp, duration) in pairs {
                    let offset_secs = match pair_mode {
                        PairTimestampMode::Absolute => timestamp - dataset.run_start_epoch(),
                        PairTimestampMode::Relative => timestamp,
                    };
                    series.samples.push(TimerSample {
                        offset_secs,
                        duration_secs: duration,
                    });
                }
            }
        }
    }

    series
}
