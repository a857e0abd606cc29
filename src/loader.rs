//! Result log loading.
//!
//! One CSV row per observed request:
//!
//! ```csv
//! request_num,elapsed_time,epoch_time,group_name,transaction_time,error,custom_timers_json
//! ```
//!
//! The last column is a JSON object mapping timer names to raw timer values
//! (see [`crate::timer::RawTimerValue`]). A single malformed row aborts the
//! whole load: the run start/finish epochs are derived from the first and
//! last retained rows, and a best-effort partial dataset would corrupt them.

use crate::error::{ReportError, Result};
use crate::timer::{RawTimerValue, TRANSACTIONS_TIMER};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One observed request from the result log. Immutable once constructed;
/// owned exclusively by the [`Dataset`].
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    /// Positive, unique within a run.
    pub request_num: u64,
    /// Seconds since run start.
    pub elapsed_time: f64,
    /// Absolute wall-clock seconds.
    pub epoch_time: f64,
    /// Virtual-user profile that issued the request.
    pub group_name: String,
    /// End-to-end duration of the transaction, in seconds.
    pub transaction_time: f64,
    /// Empty means success.
    pub error: String,
    pub custom_timers: BTreeMap<String, RawTimerValue>,
}

/// The whole parsed run: retained records in ingestion order plus
/// dataset-wide aggregates. Built once per report, read-only afterwards, and
/// safely shared across concurrent timer workers.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<ResponseRecord>,
    total_transactions: usize,
    total_errors: usize,
    unique_timer_names: BTreeSet<String>,
    unique_group_names: BTreeSet<String>,
    run_start_epoch: f64,
    run_finish_epoch: f64,
    run_time_limit: f64,
}

impl Dataset {
    /// Load a result log from a file.
    pub fn from_csv<P: AsRef<Path>>(path: P, run_time_limit: f64) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file, run_time_limit)
    }

    /// Load a result log from any reader.
    ///
    /// Records with `elapsed_time >= run_time_limit` belong to an incomplete
    /// trailing measurement interval: they are excluded from the retained
    /// sequence but still counted toward the transaction and error totals.
    pub fn from_reader<R: Read>(reader: R, run_time_limit: f64) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut total_transactions = 0;
        let mut total_errors = 0;
        let mut unique_timer_names = BTreeSet::new();
        let mut unique_group_names = BTreeSet::new();

        for row in csv_reader.records() {
            let row = row.map_err(|e| ReportError::MalformedRecord {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let record = parse_record(&row, line)?;

            unique_group_names.insert(record.group_name.clone());
            unique_timer_names.extend(record.custom_timers.keys().cloned());

            total_transactions += 1;
            if !record.error.is_empty() {
                total_errors += 1;
            }

            if record.elapsed_time < run_time_limit {
                records.push(record);
            } else {
                debug!(
                    line,
                    elapsed = record.elapsed_time,
                    "dropping record past the run time limit"
                );
            }
        }

        // Transaction times are reported like any other timer.
        unique_timer_names.insert(TRANSACTIONS_TIMER.to_string());

        let first = records.first().ok_or(ReportError::EmptyDataset)?;
        let run_start_epoch = first.epoch_time;
        let run_finish_epoch = records.last().map(|r| r.epoch_time).unwrap_or(run_start_epoch);

        debug!(
            retained = records.len(),
            total_transactions, total_errors, "dataset loaded"
        );

        Ok(Self {
            records,
            total_transactions,
            total_errors,
            unique_timer_names,
            unique_group_names,
            run_start_epoch,
            run_finish_epoch,
            run_time_limit,
        })
    }

    /// Retained records, in ingestion order.
    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    /// Count of all parsed records, including dropped ones.
    pub fn total_transactions(&self) -> usize {
        self.total_transactions
    }

    /// Count of parsed records with a non-empty error field.
    pub fn total_errors(&self) -> usize {
        self.total_errors
    }

    /// Union of all custom timer names seen, plus the synthetic
    /// `"Transactions"` entry. Sorted.
    pub fn unique_timer_names(&self) -> &BTreeSet<String> {
        &self.unique_timer_names
    }

    /// Virtual-user group names seen. Sorted.
    pub fn unique_group_names(&self) -> &BTreeSet<String> {
        &self.unique_group_names
    }

    /// Epoch of the first retained record.
    pub fn run_start_epoch(&self) -> f64 {
        self.run_start_epoch
    }

    /// Epoch of the last retained record.
    pub fn run_finish_epoch(&self) -> f64 {
        self.run_finish_epoch
    }

    pub fn run_time_limit(&self) -> f64 {
        self.run_time_limit
    }
}

fn parse_record(row: &csv::StringRecord, line: u64) -> Result<ResponseRecord> {
    if row.len() != 7 {
        return Err(ReportError::MalformedRecord {
            line,
            reason: format!("expected 7 columns, found {}", row.len()),
        });
    }

    let field = |i: usize| row.get(i).unwrap_or_default();
    let numeric = |i: usize, name: &str| -> Result<f64> {
        field(i).trim().parse().map_err(|_| ReportError::MalformedRecord {
            line,
            reason: format!("non-numeric {name}: {:?}", field(i)),
        })
    };

    let request_num = field(0)
        .trim()
        .parse()
        .map_err(|_| ReportError::MalformedRecord {
            line,
            reason: format!("non-numeric request_num: {:?}", field(0)),
        })?;
    let elapsed_time = numeric(1, "elapsed_time")?;
    let epoch_time = numeric(2, "epoch_time")?;
    let transaction_time = numeric(4, "transaction_time")?;

    let custom_timers: BTreeMap<String, RawTimerValue> = serde_json::from_str(field(6))
        .map_err(|e| ReportError::MalformedRecord {
            line,
            reason: format!("unparsable custom timer object: {e}"),
        })?;

    Ok(ResponseRecord {
        request_num,
        elapsed_time,
        epoch_time,
        group_name: field(3).to_string(),
        transaction_time,
        error: field(5).to_string(),
        custom_timers,
    })
}
