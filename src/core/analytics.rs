//! Per-window-size analytics over a completed window table.
//!
//! One [`AnalyticsSummary`] per window length, plus the comparative series
//! an external renderer needs to plot window lengths against each other.
//! Statistics that are undefined on an empty table are `None` (JSON
//! `null`). An empty run is reported as "no data", never as zeros.

use crate::config::Thresholds;
use crate::core::sample::ts_format;
use crate::core::windowing::Window;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Start/end of the window with the highest average CPU total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "ts_format")]
    pub start: NaiveDateTime,
    #[serde(with = "ts_format")]
    pub end: NaiveDateTime,
}

/// Analytics record for one window length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub window_size_seconds: u64,
    pub total_windows: u64,
    /// Share of windows under memory pressure, 2 decimals; `None` when the
    /// table is empty
    pub percent_memory_pressure: Option<f64>,
    pub cpu_saturation_count: u64,
    pub max_cpu_total_percent: Option<f64>,
    pub avg_cpu_total_percent: Option<f64>,
    pub longest_memory_pressure_streak: u64,
    pub peak_memory_used_percent: Option<f64>,
    pub peak_cpu_time_range: Option<TimeRange>,
}

/// One point of the comparative plot series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    #[serde(with = "ts_format")]
    pub window_start: NaiveDateTime,
    pub avg_cpu_total_percent: f64,
    pub max_memory_usage_percent: f64,
}

/// Plot data for one window length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub window_size_seconds: u64,
    pub points: Vec<PlotPoint>,
}

/// Summarize a window table for one window length.
pub fn summarize(windows: &[Window], window_secs: u64) -> AnalyticsSummary {
    let total_windows = windows.len() as u64;
    let pressure_count = windows.iter().filter(|w| w.memory_pressure_flag).count() as u64;
    let cpu_saturation_count = windows.iter().filter(|w| w.cpu_saturation_flag).count() as u64;

    let percent_memory_pressure = if total_windows > 0 {
        Some(round2(pressure_count as f64 / total_windows as f64 * 100.0))
    } else {
        None
    };

    let avg_cpu_total_percent = if windows.is_empty() {
        None
    } else {
        let sum: f64 = windows.iter().map(|w| w.avg_cpu_total_percent).sum();
        Some(round2(sum / windows.len() as f64))
    };

    let peak_cpu = peak_cpu_window(windows);
    let max_cpu_total_percent = peak_cpu.map(|w| w.avg_cpu_total_percent);
    let peak_cpu_time_range = peak_cpu.map(|w| TimeRange {
        start: w.window_start,
        end: w.window_end,
    });

    let peak_memory_used_percent = windows
        .iter()
        .map(|w| w.max_memory_usage_percent)
        .fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |m| m.max(v)))
        });

    AnalyticsSummary {
        window_size_seconds: window_secs,
        total_windows,
        percent_memory_pressure,
        cpu_saturation_count,
        max_cpu_total_percent,
        avg_cpu_total_percent,
        longest_memory_pressure_streak: longest_pressure_streak(windows),
        peak_memory_used_percent,
        peak_cpu_time_range,
    }
}

/// Extract the comparative plot series for one window length.
pub fn plot_series(windows: &[Window], window_secs: u64) -> PlotSeries {
    PlotSeries {
        window_size_seconds: window_secs,
        points: windows
            .iter()
            .map(|w| PlotPoint {
                window_start: w.window_start,
                avg_cpu_total_percent: w.avg_cpu_total_percent,
                max_memory_usage_percent: w.max_memory_usage_percent,
            })
            .collect(),
    }
}

/// Log the one-line summary for a window length, with threshold hints when
/// nothing crossed a threshold.
pub fn log_summary(summary: &AnalyticsSummary, thresholds: &Thresholds) {
    if summary.total_windows == 0 {
        warn!(
            "{}-second windows: no windows produced, summary unavailable",
            summary.window_size_seconds
        );
        return;
    }

    info!(
        "{}-second windows: total={}, percent_memory_pressure={:.2}, cpu_saturation={}, \
         max_cpu={:.2}, avg_cpu={:.2}, longest_memory_pressure_streak={}, peak_memory={:.1}",
        summary.window_size_seconds,
        summary.total_windows,
        summary.percent_memory_pressure.unwrap_or_default(),
        summary.cpu_saturation_count,
        summary.max_cpu_total_percent.unwrap_or_default(),
        summary.avg_cpu_total_percent.unwrap_or_default(),
        summary.longest_memory_pressure_streak,
        summary.peak_memory_used_percent.unwrap_or_default(),
    );
    if summary.percent_memory_pressure == Some(0.0) {
        info!(
            "memory pressure threshold: > {}%",
            thresholds.memory_pressure_percent
        );
    }
    if summary.cpu_saturation_count == 0 {
        info!(
            "cpu saturation threshold: < {}%",
            thresholds.cpu_saturation_percent
        );
    }
    if let Some(range) = &summary.peak_cpu_time_range {
        info!(
            "time range with highest cpu usage in {}s windows: {} to {}",
            summary.window_size_seconds,
            range.start.format(ts_format::FORMAT),
            range.end.format(ts_format::FORMAT)
        );
    }
}

/// First window attaining the maximal average CPU total (ties keep the
/// earliest).
fn peak_cpu_window(windows: &[Window]) -> Option<&Window> {
    let mut peak: Option<&Window> = None;
    for w in windows {
        match peak {
            Some(p) if w.avg_cpu_total_percent <= p.avg_cpu_total_percent => {}
            _ => peak = Some(w),
        }
    }
    peak
}

/// Longest run of consecutive windows flagged for memory pressure.
fn longest_pressure_streak(windows: &[Window]) -> u64 {
    let mut longest = 0u64;
    let mut current = 0u64;
    for w in windows {
        if w.memory_pressure_flag {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window(minute: u32, avg_cpu: f64, max_memory: f64, pressure: bool, saturation: bool) -> Window {
        let start = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(13, minute, 0)
            .unwrap();
        Window {
            window_start: start,
            window_end: start + chrono::Duration::seconds(59),
            sample_count: 60,
            avg_cpu_total_percent: avg_cpu,
            min_cpu_idle_percent: 100.0 - avg_cpu,
            max_memory_usage_percent: max_memory,
            avg_disk_usage_percent: 55.0,
            memory_pressure_flag: pressure,
            cpu_saturation_flag: saturation,
        }
    }

    #[test]
    fn test_streak_resets_on_false() {
        // Flagged everywhere except the 3rd of 5.
        let windows = vec![
            window(0, 10.0, 95.0, true, false),
            window(1, 10.0, 95.0, true, false),
            window(2, 10.0, 40.0, false, false),
            window(3, 10.0, 95.0, true, false),
            window(4, 10.0, 95.0, true, false),
        ];
        let summary = summarize(&windows, 60);
        assert_eq!(summary.longest_memory_pressure_streak, 2);
    }

    #[test]
    fn test_counts_and_percent() {
        let windows = vec![
            window(0, 10.0, 95.0, true, true),
            window(1, 20.0, 40.0, false, false),
            window(2, 30.0, 40.0, false, true),
        ];
        let summary = summarize(&windows, 60);

        assert_eq!(summary.total_windows, 3);
        assert_eq!(summary.percent_memory_pressure, Some(33.33));
        assert_eq!(summary.cpu_saturation_count, 2);
        assert_eq!(summary.avg_cpu_total_percent, Some(20.0));
        assert_eq!(summary.max_cpu_total_percent, Some(30.0));
        assert_eq!(summary.peak_memory_used_percent, Some(95.0));
    }

    #[test]
    fn test_peak_cpu_tie_keeps_first() {
        let windows = vec![
            window(0, 25.0, 40.0, false, false),
            window(1, 80.0, 40.0, false, false),
            window(2, 80.0, 40.0, false, false),
        ];
        let summary = summarize(&windows, 60);

        let range = summary.peak_cpu_time_range.unwrap();
        assert_eq!(range.start, windows[1].window_start);
        assert_eq!(range.end, windows[1].window_end);
    }

    #[test]
    fn test_empty_table_reports_unavailable() {
        let summary = summarize(&[], 60);

        assert_eq!(summary.total_windows, 0);
        assert_eq!(summary.percent_memory_pressure, None);
        assert_eq!(summary.max_cpu_total_percent, None);
        assert_eq!(summary.avg_cpu_total_percent, None);
        assert_eq!(summary.peak_memory_used_percent, None);
        assert!(summary.peak_cpu_time_range.is_none());
        assert_eq!(summary.cpu_saturation_count, 0);
        assert_eq!(summary.longest_memory_pressure_streak, 0);
    }

    #[test]
    fn test_empty_summary_serializes_nulls() {
        let summary = summarize(&[], 60);
        let json: serde_json::Value = serde_json::to_value(&summary).unwrap();

        assert!(json["percent_memory_pressure"].is_null());
        assert!(json["max_cpu_total_percent"].is_null());
        assert!(json["peak_cpu_time_range"].is_null());
        assert_eq!(json["total_windows"], 0);
    }

    #[test]
    fn test_plot_series_mirrors_table_order() {
        let windows = vec![
            window(0, 10.0, 40.0, false, false),
            window(1, 20.0, 50.0, false, false),
        ];
        let series = plot_series(&windows, 60);

        assert_eq!(series.window_size_seconds, 60);
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].window_start, windows[0].window_start);
        assert_eq!(series.points[1].avg_cpu_total_percent, 20.0);
        assert_eq!(series.points[1].max_memory_usage_percent, 50.0);
    }
}
