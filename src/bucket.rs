//! Fixed-width time bucketing of timer samples.
//!
//! Response-time buckets are anchored at the series' own smallest offset so
//! the first bucket always starts with data. Throughput bins are anchored at
//! absolute offset 0 instead, so bins line up across different timers and
//! with wall-clock elapsed time.

use crate::error::{ReportError, Result};
use crate::timer::TimerSeries;

/// One fixed-width slice of elapsed run time and the duration samples that
/// fell into it, sorted ascending. A bucket may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub index: usize,
    pub durations: Vec<f64>,
}

impl Bucket {
    pub fn count(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

/// Partition a timer series into fixed-width buckets.
///
/// `index = floor((offset - min_offset) / interval_width)`. The returned
/// sequence is a complete partition from index 0 to the maximum observed
/// index: indices with no samples are synthesized as empty buckets, so the
/// sequence has no gaps and its length is `max_index + 1`.
pub fn bucketize(series: &TimerSeries, interval_width: f64) -> Result<Vec<Bucket>> {
    if interval_width <= 0.0 {
        return Err(ReportError::InvalidInterval {
            interval: interval_width,
        });
    }
    let min_offset = series.min_offset().ok_or(ReportError::EmptySeries)?;

    let index_of =
        |offset: f64| -> usize { ((offset - min_offset) / interval_width).floor() as usize };

    let max_index = series
        .samples
        .iter()
        .map(|s| index_of(s.offset_secs))
        .max()
        .unwrap_or(0);

    let mut buckets: Vec<Bucket> = (0..=max_index)
        .map(|index| Bucket {
            index,
            durations: Vec::new(),
        })
        .collect();

    for sample in &series.samples {
        buckets[index_of(sample.offset_secs)]
            .durations
            .push(sample.duration_secs);
    }

    for bucket in &mut buckets {
        bucket
            .durations
            .sort_by(|a, b| a.partial_cmp(b).expect("duration samples must not be NaN"));
    }

    Ok(buckets)
}

/// Count samples per fixed-width bin over `[0, run_time_limit)` and divide by
/// the bin width to yield a rate.
///
/// Bins are anchored at absolute offset 0, not at the series' own minimum.
/// Samples outside `[0, run_time_limit)` are ignored. Returns
/// `(bin_start, samples_per_second)` per bin.
pub fn throughput(
    series: &TimerSeries,
    interval_width: f64,
    run_time_limit: f64,
) -> Result<Vec<(f64, f64)>> {
    if interval_width <= 0.0 {
        return Err(ReportError::InvalidInterval {
            interval: interval_width,
        });
    }

    let bin_count = (run_time_limit / interval_width).ceil() as usize;
    let mut counts = vec![0usize; bin_count];

    for sample in &series.samples {
        let offset = sample.offset_secs;
        if offset < 0.0 || offset >= run_time_limit {
            continue;
        }
        let bin = ((offset / interval_width).floor() as usize).min(bin_count.saturating_sub(1));
        counts[bin] += 1;
    }

    Ok(counts
        .iter()
        .enumerate()
        .map(|(i, &count)| (i as f64 * interval_width, count as f64 / interval_width))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{TimerSample, TimerSeries};

    fn series(points: &[(f64, f64)]) -> TimerSeries {
        TimerSeries {
            samples: points
                .iter()
                .map(|&(offset_secs, duration_secs)| TimerSample {
                    offset_secs,
                    duration_secs,
                })
                .collect(),
        }
    }

    #[test]
    fn test_bucket_indices_are_gap_free() {
        // Samples at offsets 0 and 35 with width 10 leave indices 1 and 2 empty.
        let s = series(&[(0.0, 1.0), (35.0, 2.0)]);
        let buckets = bucketize(&s, 10.0).unwrap();

        assert_eq!(buckets.len(), 4);
        for (i, bucket) in buckets.iter().enumerate() {
            assert_eq!(bucket.index, i);
        }
        assert_eq!(buckets[0].count(), 1);
        assert!(buckets[1].is_empty());
        assert!(buckets[2].is_empty());
        assert_eq!(buckets[3].count(), 1);
    }

    #[test]
    fn test_bucket_union_preserves_multiset() {
        let s = series(&[
            (1.0, 3.0),
            (2.0, 1.0),
            (11.0, 2.0),
            (11.5, 2.0),
            (25.0, 9.0),
        ]);
        let buckets = bucketize(&s, 10.0).unwrap();

        let mut collected: Vec<f64> = buckets.iter().flat_map(|b| b.durations.clone()).collect();
        collected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(collected, vec![1.0, 2.0, 2.0, 3.0, 9.0]);
    }

    #[test]
    fn test_buckets_anchor_at_series_min_offset() {
        // min_offset = 7, so a sample at 16.9 lands in bucket 0.
        let s = series(&[(7.0, 1.0), (16.9, 2.0), (17.0, 3.0)]);
        let buckets = bucketize(&s, 10.0).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].durations, vec![1.0, 2.0]);
        assert_eq!(buckets[1].durations, vec![3.0]);
    }

    #[test]
    fn test_bucket_durations_sorted_ascending() {
        let s = series(&[(1.0, 5.0), (2.0, 1.0), (3.0, 3.0)]);
        let buckets = bucketize(&s, 10.0).unwrap();
        assert_eq!(buckets[0].durations, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_bucketize_empty_series_fails() {
        assert!(matches!(
            bucketize(&TimerSeries::default(), 10.0),
            Err(ReportError::EmptySeries)
        ));
    }

    #[test]
    fn test_bucketize_rejects_nonpositive_interval() {
        let s = series(&[(0.0, 1.0)]);
        assert!(matches!(
            bucketize(&s, 0.0),
            Err(ReportError::InvalidInterval { .. })
        ));
        assert!(matches!(
            bucketize(&s, -5.0),
            Err(ReportError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn test_throughput_bins_anchor_at_zero() {
        // Series starts at offset 12; the first throughput bin still covers
        // [0, 10) and is empty.
        let s = series(&[(12.0, 1.0), (13.0, 1.0), (21.0, 1.0)]);
        let bins = throughput(&s, 10.0, 30.0).unwrap();

        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0], (0.0, 0.0));
        assert_eq!(bins[1], (10.0, 0.2));
        assert_eq!(bins[2], (20.0, 0.1));
    }

    #[test]
    fn test_throughput_ignores_samples_past_limit() {
        let s = series(&[(5.0, 1.0), (35.0, 1.0)]);
        let bins = throughput(&s, 10.0, 30.0).unwrap();
        let total: f64 = bins.iter().map(|&(_, rate)| rate * 10.0).sum();
        assert_eq!(total, 1.0);
    }

    #[test]
    fn test_throughput_bin_count_covers_partial_tail() {
        let s = series(&[(0.0, 1.0)]);
        let bins = throughput(&s, 10.0, 25.0).unwrap();
        assert_eq!(bins.len(), 3);
    }
}
