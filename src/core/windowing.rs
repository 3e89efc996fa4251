//! Time-window aggregation of validated samples.
//!
//! Samples are bucketed into fixed-width intervals whose boundaries sit at
//! whole multiples of the window length from the Unix epoch, so the grid is
//! deterministic no matter where the sample sequence starts. Buckets are
//! right-closed: a sample falling exactly on a boundary belongs to the
//! window ending there. Empty buckets are never materialized; the output
//! table is sparse, not interpolated.

use crate::config::Thresholds;
use crate::core::flags;
use crate::core::sample::{ts_format, MetricSample};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Aggregates over one non-empty time bucket.
///
/// `window_start`/`window_end` are the earliest and latest sample
/// timestamps inside the bucket, not the bucket boundaries. Field order
/// matches the processed CSV schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    #[serde(with = "ts_format")]
    pub window_start: NaiveDateTime,
    #[serde(with = "ts_format")]
    pub window_end: NaiveDateTime,
    pub sample_count: u64,
    /// Mean CPU user + mean CPU system, 1 decimal
    pub avg_cpu_total_percent: f64,
    /// Lowest idle seen in the bucket, unrounded
    pub min_cpu_idle_percent: f64,
    pub max_memory_usage_percent: f64,
    pub avg_disk_usage_percent: f64,
    pub memory_pressure_flag: bool,
    pub cpu_saturation_flag: bool,
}

/// Bucket validated samples into `window_secs`-wide windows and aggregate
/// each non-empty bucket.
///
/// The input must be chronologically ordered (the validator guarantees
/// this); output windows come out ascending by `window_start`. Each window
/// length is aggregated independently; calling this once per configured
/// length shares no state between calls.
pub fn build_windows(
    samples: &[MetricSample],
    window_secs: u64,
    thresholds: &Thresholds,
) -> Vec<Window> {
    assert!(window_secs > 0, "window length must be positive");

    let mut windows = Vec::new();
    let mut bucket: Vec<&MetricSample> = Vec::new();
    let mut current: Option<i64> = None;

    for sample in samples {
        let index = bucket_index(sample.timestamp, window_secs);
        if current != Some(index) {
            if !bucket.is_empty() {
                windows.push(aggregate(&bucket, thresholds));
                bucket.clear();
            }
            current = Some(index);
        }
        bucket.push(sample);
    }
    if !bucket.is_empty() {
        windows.push(aggregate(&bucket, thresholds));
    }

    windows
}

/// Index of the epoch-anchored bucket a timestamp falls into.
fn bucket_index(timestamp: NaiveDateTime, window_secs: u64) -> i64 {
    let ts = timestamp.and_utc().timestamp();
    let width = window_secs as i64;
    let index = ts.div_euclid(width);
    // Boundary samples close the window ending at that boundary.
    if ts.rem_euclid(width) == 0 {
        index - 1
    } else {
        index
    }
}

fn aggregate(bucket: &[&MetricSample], thresholds: &Thresholds) -> Window {
    let cpu_user: Vec<f64> = bucket.iter().map(|s| s.cpu_user_percent).collect();
    let cpu_system: Vec<f64> = bucket.iter().map(|s| s.cpu_system_percent).collect();
    let cpu_idle: Vec<f64> = bucket.iter().map(|s| s.cpu_idle_percent).collect();
    let memory_used: Vec<f64> = bucket.iter().map(|s| s.memory_used_percent).collect();
    let disk_used: Vec<f64> = bucket.iter().map(|s| s.disk_used_percent).collect();

    let avg_cpu_total =
        round1(Statistics::mean(cpu_user.iter()) + Statistics::mean(cpu_system.iter()));
    let min_cpu_idle = Statistics::min(cpu_idle.iter());
    let max_memory = round1(Statistics::max(memory_used.iter()));
    let avg_disk = round1(Statistics::mean(disk_used.iter()));

    Window {
        window_start: bucket[0].timestamp,
        window_end: bucket[bucket.len() - 1].timestamp,
        sample_count: bucket.len() as u64,
        avg_cpu_total_percent: avg_cpu_total,
        min_cpu_idle_percent: min_cpu_idle,
        max_memory_usage_percent: max_memory,
        avg_disk_usage_percent: avg_disk,
        memory_pressure_flag: flags::memory_pressure(max_memory, thresholds),
        cpu_saturation_flag: flags::cpu_saturation(min_cpu_idle, thresholds),
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(
        hms: (u32, u32, u32),
        user: f64,
        system: f64,
        idle: f64,
        mem: f64,
        disk: f64,
    ) -> MetricSample {
        MetricSample {
            timestamp: NaiveDate::from_ymd_opt(2025, 3, 14)
                .unwrap()
                .and_hms_opt(hms.0, hms.1, hms.2)
                .unwrap(),
            cpu_user_percent: user,
            cpu_system_percent: system,
            cpu_idle_percent: idle,
            memory_used_percent: mem,
            disk_used_percent: disk,
        }
    }

    fn steady_samples() -> Vec<MetricSample> {
        // 6 samples at 1-second cadence, 13:26:39 through 13:26:44
        (39..=44)
            .map(|s| sample((13, 26, s), 10.0, 5.0, 85.0, 40.0, 55.0))
            .collect()
    }

    #[test]
    fn test_two_second_windows_pair_samples() {
        let thresholds = Thresholds::default();
        let windows = build_windows(&steady_samples(), 2, &thresholds);

        assert_eq!(windows.len(), 3);
        for w in &windows {
            assert_eq!(w.sample_count, 2);
        }
        let starts: Vec<u32> = windows
            .iter()
            .map(|w| chrono::Timelike::second(&w.window_start))
            .collect();
        assert_eq!(starts, vec![39, 41, 43]);
    }

    #[test]
    fn test_windows_ascending_and_non_empty() {
        let thresholds = Thresholds::default();
        let windows = build_windows(&steady_samples(), 2, &thresholds);

        assert!(windows.iter().all(|w| w.sample_count >= 1));
        assert!(windows
            .windows(2)
            .all(|p| p[0].window_start < p[1].window_start));
    }

    #[test]
    fn test_aggregates() {
        let thresholds = Thresholds::default();
        let samples = vec![
            sample((13, 26, 41), 10.0, 5.0, 85.0, 40.0, 50.0),
            sample((13, 26, 42), 20.0, 7.0, 73.0, 60.0, 51.0),
        ];
        let windows = build_windows(&samples, 2, &thresholds);

        assert_eq!(windows.len(), 1);
        let w = &windows[0];
        assert_eq!(w.sample_count, 2);
        assert_eq!(w.avg_cpu_total_percent, 21.0); // mean(10,20) + mean(5,7)
        assert_eq!(w.min_cpu_idle_percent, 73.0);
        assert_eq!(w.max_memory_usage_percent, 60.0);
        assert_eq!(w.avg_disk_usage_percent, 50.5);
        assert_eq!(w.window_start, samples[0].timestamp);
        assert_eq!(w.window_end, samples[1].timestamp);
    }

    #[test]
    fn test_gap_produces_sparse_output() {
        let thresholds = Thresholds::default();
        // A long gap between the two samples: the buckets in between must
        // not appear as zero-filled rows.
        let samples = vec![
            sample((13, 0, 1), 10.0, 5.0, 85.0, 40.0, 55.0),
            sample((13, 10, 1), 10.0, 5.0, 85.0, 40.0, 55.0),
        ];
        let windows = build_windows(&samples, 60, &thresholds);

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].sample_count, 1);
        assert_eq!(windows[1].sample_count, 1);
    }

    #[test]
    fn test_bucket_grid_is_epoch_anchored() {
        let thresholds = Thresholds::default();
        // Shifting the whole sequence by one second moves samples across
        // fixed boundaries instead of shifting the boundaries with them.
        let shifted: Vec<MetricSample> = (40..=45)
            .map(|s| sample((13, 26, s), 10.0, 5.0, 85.0, 40.0, 55.0))
            .collect();
        let windows = build_windows(&shifted, 2, &thresholds);

        let counts: Vec<u64> = windows.iter().map(|w| w.sample_count).collect();
        assert_eq!(counts, vec![1, 2, 2, 1]);
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let thresholds = Thresholds::default();
        let samples = steady_samples();
        let first = build_windows(&samples, 2, &thresholds);
        let second = build_windows(&samples, 2, &thresholds);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input_yields_no_windows() {
        let thresholds = Thresholds::default();
        assert!(build_windows(&[], 60, &thresholds).is_empty());
    }

    #[test]
    fn test_flags_applied_per_window() {
        let thresholds = Thresholds::default();
        let samples = vec![
            sample((13, 26, 41), 10.0, 5.0, 85.0, 95.0, 55.0),
            sample((13, 26, 43), 90.0, 8.0, 2.0, 40.0, 55.0),
        ];
        let windows = build_windows(&samples, 2, &thresholds);

        assert_eq!(windows.len(), 2);
        assert!(windows[0].memory_pressure_flag);
        assert!(!windows[0].cpu_saturation_flag);
        assert!(!windows[1].memory_pressure_flag);
        assert!(windows[1].cpu_saturation_flag);
    }
}
