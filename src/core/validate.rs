//! Raw sample validation.
//!
//! Cleans a raw CSV row sequence into chronologically ordered, range-checked
//! samples. Each rule is an independent filter pass over an immutable
//! sequence; a dropped row is gone before the next rule runs, so every row
//! is deleted (and logged) at most once. Bad data is never an error here;
//! structural problems are caught by the dataset reader before validation.

use crate::core::sample::{ts_format, MetricSample, RawRecord};
use chrono::NaiveDateTime;
use statrs::statistics::Statistics;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Allowed slack when checking that CPU user+system+idle sums to ~100.
pub const CPU_SUM_TOLERANCE: f64 = 0.1;

/// Min/max/mean of one numeric column over the validated rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl FieldStats {
    fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
            mean: Statistics::mean(values.iter()),
        })
    }
}

/// Row counts and per-column statistics for one validation run.
///
/// Column statistics are `None` when no rows survived validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationStats {
    pub initial_count: usize,
    pub final_count: usize,
    pub rows_deleted: usize,
    pub cpu_user: Option<FieldStats>,
    pub cpu_system: Option<FieldStats>,
    pub cpu_idle: Option<FieldStats>,
    pub memory_used: Option<FieldStats>,
    pub disk_used: Option<FieldStats>,
    pub elapsed: Duration,
}

/// A row whose numeric columns parsed, before timestamp checks.
#[derive(Debug, Clone)]
struct CoercedRow {
    row: usize,
    timestamp: Option<String>,
    cpu_user: Option<f64>,
    cpu_system: Option<f64>,
    cpu_idle: Option<f64>,
    memory_used: Option<f64>,
    disk_used: Option<f64>,
}

/// A row with a parsed, in-order timestamp.
#[derive(Debug, Clone)]
struct TimedRow {
    row: usize,
    timestamp: NaiveDateTime,
    cpu_user: Option<f64>,
    cpu_system: Option<f64>,
    cpu_idle: Option<f64>,
    memory_used: Option<f64>,
    disk_used: Option<f64>,
}

/// Validate a raw row sequence.
///
/// Rules run in order, each scanning only rows retained by the previous
/// ones:
///
/// 1. numeric coercion: a present but non-numeric value drops the row
/// 2. timestamp: missing, unparseable, or earlier than the previous
///    retained row drops the row (the out-of-order row is discarded, the
///    earlier one stands)
/// 3. range: each percentage column must be present and within [0, 100]
/// 4. sum consistency: CPU user+system+idle must not exceed 100 plus
///    [`CPU_SUM_TOLERANCE`]
///
/// Every drop emits one WARN diagnostic naming the rule and the offending
/// value.
pub fn validate(records: Vec<RawRecord>) -> (Vec<MetricSample>, ValidationStats) {
    let started = Instant::now();
    let initial_count = records.len();

    let coerced: Vec<CoercedRow> = records.iter().filter_map(coerce).collect();
    let timed = check_timestamps(coerced);

    let timed = range_pass(timed, "cpu_user_percent", |r| r.cpu_user);
    let timed = range_pass(timed, "cpu_system_percent", |r| r.cpu_system);
    let timed = range_pass(timed, "cpu_idle_percent", |r| r.cpu_idle);
    let timed = range_pass(timed, "memory_used_percent", |r| r.memory_used);
    let timed = range_pass(timed, "disk_used_percent", |r| r.disk_used);

    let samples = check_cpu_sum(complete_rows(timed));

    let final_count = samples.len();
    let stats = ValidationStats {
        initial_count,
        final_count,
        rows_deleted: initial_count - final_count,
        cpu_user: column_stats(&samples, |s| s.cpu_user_percent),
        cpu_system: column_stats(&samples, |s| s.cpu_system_percent),
        cpu_idle: column_stats(&samples, |s| s.cpu_idle_percent),
        memory_used: column_stats(&samples, |s| s.memory_used_percent),
        disk_used: column_stats(&samples, |s| s.disk_used_percent),
        elapsed: started.elapsed(),
    };
    log_stats(&stats);

    (samples, stats)
}

/// Parse the numeric columns of one raw record (rule 1).
fn coerce(record: &RawRecord) -> Option<CoercedRow> {
    Some(CoercedRow {
        row: record.row,
        timestamp: record.timestamp.clone(),
        cpu_user: parse_numeric(record.row, "cpu_user_percent", &record.cpu_user_percent)?,
        cpu_system: parse_numeric(record.row, "cpu_system_percent", &record.cpu_system_percent)?,
        cpu_idle: parse_numeric(record.row, "cpu_idle_percent", &record.cpu_idle_percent)?,
        memory_used: parse_numeric(record.row, "memory_used_percent", &record.memory_used_percent)?,
        disk_used: parse_numeric(record.row, "disk_used_percent", &record.disk_used_percent)?,
    })
}

/// `None` means the whole row must be dropped; `Some(None)` is a missing
/// value, left for the range rule to report.
fn parse_numeric(row: usize, column: &str, value: &Option<String>) -> Option<Option<f64>> {
    match value {
        None => Some(None),
        Some(s) => match s.parse::<f64>() {
            Ok(v) => Some(Some(v)),
            Err(_) => {
                warn!("row {row}: non-numeric value in {column}: {s}");
                None
            }
        },
    }
}

/// Timestamp rule: parseable ISO-8601 and never earlier than the previous
/// retained row (rule 2).
fn check_timestamps(rows: Vec<CoercedRow>) -> Vec<TimedRow> {
    let mut retained = Vec::with_capacity(rows.len());
    let mut last: Option<NaiveDateTime> = None;

    for r in rows {
        let raw = match r.timestamp.as_deref() {
            Some(raw) => raw,
            None => {
                warn!("row {}: null value in timestamp column", r.row);
                continue;
            }
        };
        let timestamp = match raw.parse::<NaiveDateTime>() {
            Ok(ts) => ts,
            Err(_) => {
                warn!("row {}: invalid timestamp format: {}", r.row, raw);
                continue;
            }
        };
        if let Some(prev) = last {
            if timestamp < prev {
                warn!(
                    "row {}: timestamps not in chronological order: {} followed by {}",
                    r.row,
                    prev.format(ts_format::FORMAT),
                    timestamp.format(ts_format::FORMAT)
                );
                continue;
            }
        }
        last = Some(timestamp);
        retained.push(TimedRow {
            row: r.row,
            timestamp,
            cpu_user: r.cpu_user,
            cpu_system: r.cpu_system,
            cpu_idle: r.cpu_idle,
            memory_used: r.memory_used,
            disk_used: r.disk_used,
        });
    }

    retained
}

/// Range rule for one column: present and within [0, 100] (rule 3).
fn range_pass<F>(rows: Vec<TimedRow>, column: &str, value: F) -> Vec<TimedRow>
where
    F: Fn(&TimedRow) -> Option<f64>,
{
    rows.into_iter()
        .filter(|r| match value(r) {
            None => {
                warn!("row {}: null value in {} column", r.row, column);
                false
            }
            Some(v) if !(0.0..=100.0).contains(&v) => {
                warn!("row {}: invalid {} value: {:.1}", r.row, column, v);
                false
            }
            Some(_) => true,
        })
        .collect()
}

/// Rows that reach this point have every column present.
fn complete_rows(rows: Vec<TimedRow>) -> Vec<(usize, MetricSample)> {
    rows.into_iter()
        .filter_map(|r| {
            match (
                r.cpu_user,
                r.cpu_system,
                r.cpu_idle,
                r.memory_used,
                r.disk_used,
            ) {
                (Some(u), Some(s), Some(i), Some(m), Some(d)) => Some((
                    r.row,
                    MetricSample {
                        timestamp: r.timestamp,
                        cpu_user_percent: u,
                        cpu_system_percent: s,
                        cpu_idle_percent: i,
                        memory_used_percent: m,
                        disk_used_percent: d,
                    },
                )),
                _ => None,
            }
        })
        .collect()
}

/// Sum-consistency rule: CPU user+system+idle ≤ 100 + tolerance (rule 4).
fn check_cpu_sum(rows: Vec<(usize, MetricSample)>) -> Vec<MetricSample> {
    rows.into_iter()
        .filter_map(|(row, sample)| {
            let total =
                sample.cpu_user_percent + sample.cpu_system_percent + sample.cpu_idle_percent;
            if total > 100.0 + CPU_SUM_TOLERANCE {
                warn!("row {}: cpu percentages do not sum to 100: total={:.1}", row, total);
                None
            } else {
                Some(sample)
            }
        })
        .collect()
}

fn column_stats<F>(samples: &[MetricSample], value: F) -> Option<FieldStats>
where
    F: Fn(&MetricSample) -> f64,
{
    let values: Vec<f64> = samples.iter().map(value).collect();
    FieldStats::compute(&values)
}

fn log_stats(stats: &ValidationStats) {
    info!("total rows: {}", stats.initial_count);
    info!("valid rows: {}", stats.final_count);
    warn!("rows deleted during validation: {}", stats.rows_deleted);
    if let Some(cpu_user) = stats.cpu_user {
        info!(
            "cpu_user_percent - min: {:.1}, max: {:.1}, avg: {:.1}",
            cpu_user.min, cpu_user.max, cpu_user.mean
        );
    }
    if let Some(memory_used) = stats.memory_used {
        info!("memory_used_percent - avg: {:.1}", memory_used.mean);
    }
    info!("validation completed in {:.3}s", stats.elapsed.as_secs_f64());
}
