//! Report assembly.
//!
//! For every timer name in the dataset (sorted for determinism) the
//! assembler runs normalize → bucketize → statistics and produces the
//! whole-series summary, the per-interval table, and the graph-ready series
//! consumed by the charting collaborator. Per-timer processing shares no
//! mutable state, so it fans out across cores with rayon and the results are
//! merged back by timer name.

use crate::bucket::{bucketize, throughput};
use crate::cli::ReportConfig;
use crate::error::Result;
use crate::loader::Dataset;
use crate::render::chart_filename;
use crate::stats::{Stat, SummaryStats};
use crate::timer::normalize_timer;
use chrono::{Local, TimeZone};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One row of the per-interval table. Statistic fields are unavailable when
/// the interval received no samples; `count` is 0 and `rate` is 0 in that
/// case.
#[derive(Debug, Clone, Serialize)]
pub struct IntervalRow {
    /// 1-based interval number.
    pub interval: usize,
    /// End of the interval in elapsed seconds, the display key for tables
    /// and graphs.
    pub interval_start: f64,
    pub count: usize,
    pub rate: f64,
    pub min: Stat,
    pub avg: Stat,
    pub pct_25: Stat,
    pub pct_50: Stat,
    pub pct_80: Stat,
    pub pct_90: Stat,
    pub pct_95: Stat,
    pub max: Stat,
    pub stdev: Stat,
}

/// Percentile-over-time lines, one `(interval_end, value)` point per
/// non-empty bucket.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PercentileLines {
    pub pct_50: Vec<(f64, f64)>,
    pub pct_80: Vec<(f64, f64)>,
    pub pct_90: Vec<(f64, f64)>,
    pub pct_95: Vec<(f64, f64)>,
}

/// Graph-ready series for one timer, handed to the charting collaborator.
/// The renderer is expected to stack summary (percentile lines), detail
/// (raw scatter), and throughput panels into one image.
#[derive(Debug, Clone, Serialize)]
pub struct TimerGraphs {
    pub percentiles: PercentileLines,
    /// Raw unbucketed `(offset, duration)` samples.
    pub scatter: Vec<(f64, f64)>,
    /// `(bin_start, samples_per_second)` anchored at offset 0.
    pub throughput: Vec<(f64, f64)>,
}

/// Everything the templating collaborator needs for one timer.
#[derive(Debug, Clone, Serialize)]
pub struct TimerReport {
    pub summary: SummaryStats,
    pub table: Vec<IntervalRow>,
    pub graph_filename: String,
}

/// The single data structure handed to the templating collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub total_transactions: usize,
    pub total_errors: usize,
    pub run_time: f64,
    pub rampup: f64,
    pub test_start: String,
    pub test_finish: String,
    pub timeseries_interval: f64,
    pub user_group_configs: Vec<String>,
    pub timers: BTreeMap<String, TimerReport>,
}

/// Assembled report: the templating data plus the per-timer chart series.
#[derive(Debug)]
pub struct AssembledReport {
    pub data: ReportData,
    pub graphs: BTreeMap<String, TimerGraphs>,
}

/// Runs the per-timer pipeline over a loaded dataset.
pub struct ReportAssembler<'a> {
    dataset: &'a Dataset,
    config: &'a ReportConfig,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(dataset: &'a Dataset, config: &'a ReportConfig) -> Self {
        Self { dataset, config }
    }

    /// Build the full report.
    ///
    /// A timer whose series came out empty is logged and skipped rather than
    /// failing the whole report; any other per-timer error is fatal.
    pub fn assemble(&self) -> Result<AssembledReport> {
        let names: Vec<&String> = self.dataset.unique_timer_names().iter().collect();

        let built: Vec<Result<Option<(String, TimerReport, TimerGraphs)>>> =
            if self.config.sequential {
                names
                    .iter()
                    .map(|name| self.build_timer(name.as_str()))
                    .collect()
            } else {
                names
                    .par_iter()
                    .map(|name| self.build_timer(name.as_str()))
                    .collect()
            };

        let mut timers = BTreeMap::new();
        let mut graphs = BTreeMap::new();
        for result in built {
            if let Some((name, report, graph)) = result? {
                timers.insert(name.clone(), report);
                graphs.insert(name, graph);
            }
        }

        let data = ReportData {
            total_transactions: self.dataset.total_transactions(),
            total_errors: self.dataset.total_errors(),
            run_time: self.config.run_time_limit,
            rampup: self.config.rampup,
            test_start: format_epoch(self.dataset.run_start_epoch()),
            test_finish: format_epoch(self.dataset.run_finish_epoch()),
            timeseries_interval: self.config.interval_width,
            user_group_configs: self
                .dataset
                .unique_group_names()
                .iter()
                .cloned()
                .collect(),
            timers,
        };

        Ok(AssembledReport { data, graphs })
    }

    fn build_timer(&self, name: &str) -> Result<Option<(String, TimerReport, TimerGraphs)>> {
        let series = normalize_timer(self.dataset, name, self.config.pair_timestamps);
        if series.is_empty() {
            warn!(timer = name, "timer produced no samples; skipping");
            return Ok(None);
        }
        debug!(timer = name, samples = series.len(), "processing timer");

        let summary = SummaryStats::from_durations(&series.durations())?;
        let buckets = bucketize(&series, self.config.interval_width)?;

        let mut table = Vec::with_capacity(buckets.len());
        let mut percentiles = PercentileLines::default();
        for bucket in &buckets {
            let interval = bucket.index + 1;
            let interval_start = interval as f64 * self.config.interval_width;

            if bucket.is_empty() {
                table.push(IntervalRow::unavailable(interval, interval_start));
                continue;
            }

            let stats = SummaryStats::from_durations(&bucket.durations)?;
            percentiles.pct_50.push((interval_start, stats.pct_50));
            percentiles.pct_80.push((interval_start, stats.pct_80));
            percentiles.pct_90.push((interval_start, stats.pct_90));
            percentiles.pct_95.push((interval_start, stats.pct_95));
            table.push(IntervalRow::from_stats(
                interval,
                interval_start,
                &stats,
                self.config.interval_width,
            ));
        }

        let graphs = TimerGraphs {
            percentiles,
            scatter: series
                .samples
                .iter()
                .map(|s| (s.offset_secs, s.duration_secs))
                .collect(),
            throughput: throughput(
                &series,
                self.config.interval_width,
                self.config.run_time_limit,
            )?,
        };

        let report = TimerReport {
            summary,
            table,
            graph_filename: chart_filename(name),
        };

        Ok(Some((name.to_string(), report, graphs)))
    }
}

impl IntervalRow {
    /// Row for an interval that received no samples.
    fn unavailable(interval: usize, interval_start: f64) -> Self {
        Self {
            interval,
            interval_start,
            count: 0,
            rate: 0.0,
            min: Stat::NotAvailable,
            avg: Stat::NotAvailable,
            pct_25: Stat::NotAvailable,
            pct_50: Stat::NotAvailable,
            pct_80: Stat::NotAvailable,
            pct_90: Stat::NotAvailable,
            pct_95: Stat::NotAvailable,
            max: Stat::NotAvailable,
            stdev: Stat::NotAvailable,
        }
    }

    fn from_stats(
        interval: usize,
        interval_start: f64,
        stats: &SummaryStats,
        interval_width: f64,
    ) -> Self {
        Self {
            interval,
            interval_start,
            count: stats.count,
            rate: stats.count as f64 / interval_width,
            min: stats.min.into(),
            avg: stats.avg.into(),
            pct_25: stats.pct_25.into(),
            pct_50: stats.pct_50.into(),
            pct_80: stats.pct_80.into(),
            pct_90: stats.pct_90.into(),
            pct_95: stats.pct_95.into(),
            max: stats.max.into(),
            stdev: stats.stdev.into(),
        }
    }
}

/// Format an epoch-seconds value as a local datetime string for the report
/// header. Falls back to the raw value if it is outside the representable
/// range.
fn format_epoch(epoch: f64) -> String {
    Local
        .timestamp_opt(epoch as i64, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{epoch:.0}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{PairTimestampMode, ReportConfig};
    use crate::timer::TRANSACTIONS_TIMER;
    use std::path::PathBuf;

    fn config(interval_width: f64, run_time_limit: f64) -> ReportConfig {
        ReportConfig {
            run_time_limit,
            interval_width,
            rampup: 30.0,
            output_dir: PathBuf::from("./"),
            pair_timestamps: PairTimestampMode::Absolute,
            sequential: true,
        }
    }

    fn dataset(rows: &str, limit: f64) -> Dataset {
        Dataset::from_reader(rows.as_bytes(), limit).unwrap()
    }

    #[test]
    fn test_assemble_dataset_level_fields() {
        let rows = concat!(
            "1,1.0,1289400001.0,group-a,0.2,,\"{\"\"db\"\": 0.1}\"\n",
            "2,2.0,1289400002.0,group-b,0.3,oops,{}\n",
        );
        let ds = dataset(rows, 60.0);
        let cfg = config(10.0, 60.0);
        let report = ReportAssembler::new(&ds, &cfg).assemble().unwrap();

        assert_eq!(report.data.total_transactions, 2);
        assert_eq!(report.data.total_errors, 1);
        assert_eq!(report.data.run_time, 60.0);
        assert_eq!(report.data.rampup, 30.0);
        assert_eq!(report.data.timeseries_interval, 10.0);
        assert_eq!(report.data.user_group_configs, vec!["group-a", "group-b"]);
        assert!(!report.data.test_start.is_empty());
        assert!(!report.data.test_finish.is_empty());
    }

    #[test]
    fn test_timers_processed_in_sorted_order_with_transactions() {
        let rows = concat!(
            "1,1.0,1289400001.0,group-a,0.2,,\"{\"\"zeta\"\": 0.1, \"\"alpha\"\": 0.2}\"\n",
        );
        let ds = dataset(rows, 60.0);
        let cfg = config(10.0, 60.0);
        let report = ReportAssembler::new(&ds, &cfg).assemble().unwrap();

        let names: Vec<&str> = report.data.timers.keys().map(String::as_str).collect();
        assert_eq!(names, vec![TRANSACTIONS_TIMER, "alpha", "zeta"]);
        assert_eq!(
            report.data.timers["alpha"].graph_filename,
            "alpha_response_times_intervals.png"
        );
    }

    #[test]
    fn test_empty_bucket_rows_carry_not_available() {
        // Samples at offsets 1 and 25 with width 10: bucket 1 is empty.
        let rows = concat!(
            "1,1.0,1289400001.0,group-a,0.2,,{}\n",
            "2,25.0,1289400025.0,group-a,0.3,,{}\n",
        );
        let ds = dataset(rows, 60.0);
        let cfg = config(10.0, 60.0);
        let report = ReportAssembler::new(&ds, &cfg).assemble().unwrap();

        let table = &report.data.timers[TRANSACTIONS_TIMER].table;
        assert_eq!(table.len(), 3);
        assert_eq!(table[1].count, 0);
        assert_eq!(table[1].rate, 0.0);
        assert_eq!(table[1].min, Stat::NotAvailable);
        assert_eq!(table[1].stdev, Stat::NotAvailable);
        assert_eq!(table[0].count, 1);
        assert_eq!(table[0].rate, 0.1);
        assert_eq!(table[0].interval, 1);
        assert_eq!(table[0].interval_start, 10.0);
    }

    #[test]
    fn test_percentile_lines_skip_empty_buckets() {
        let rows = concat!(
            "1,1.0,1289400001.0,group-a,0.2,,{}\n",
            "2,25.0,1289400025.0,group-a,0.3,,{}\n",
        );
        let ds = dataset(rows, 60.0);
        let cfg = config(10.0, 60.0);
        let report = ReportAssembler::new(&ds, &cfg).assemble().unwrap();

        let lines = &report.graphs[TRANSACTIONS_TIMER].percentiles;
        assert_eq!(lines.pct_50.len(), 2);
        assert_eq!(lines.pct_50[0].0, 10.0);
        assert_eq!(lines.pct_50[1].0, 30.0);
    }

    #[test]
    fn test_timer_named_only_in_dropped_records_is_skipped() {
        // "slow" appears only on a record past the run time limit, so its
        // name is known but its series is empty; the report must not fail.
        let rows = concat!(
            "1,1.0,1289400001.0,group-a,0.2,,{}\n",
            "2,99.0,1289400099.0,group-a,0.3,,\"{\"\"slow\"\": 1.0}\"\n",
        );
        let ds = dataset(rows, 60.0);
        assert!(ds.unique_timer_names().contains("slow"));

        let cfg = config(10.0, 60.0);
        let report = ReportAssembler::new(&ds, &cfg).assemble().unwrap();
        assert!(!report.data.timers.contains_key("slow"));
        assert!(report.data.timers.contains_key(TRANSACTIONS_TIMER));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let rows = concat!(
            "1,1.0,1289400001.0,group-a,0.2,,\"{\"\"db\"\": [0.1, 0.4]}\"\n",
            "2,12.0,1289400012.0,group-a,0.3,,\"{\"\"db\"\": 0.2}\"\n",
            "3,23.0,1289400023.0,group-a,0.4,,\"{\"\"cache\"\": [[1289400020.0, 0.05]]}\"\n",
        );
        let ds = dataset(rows, 60.0);
        let mut cfg = config(10.0, 60.0);

        cfg.sequential = true;
        let seq = ReportAssembler::new(&ds, &cfg).assemble().unwrap();
        cfg.sequential = false;
        let par = ReportAssembler::new(&ds, &cfg).assemble().unwrap();

        assert_eq!(
            serde_json::to_string(&seq.data).unwrap(),
            serde_json::to_string(&par.data).unwrap()
        );
    }
}
