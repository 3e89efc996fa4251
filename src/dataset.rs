//! Dataset I/O: raw CSV in, window tables and analytics artifacts out.
//!
//! The raw reader is permissive about values (every field comes back as an
//! optional string for the validator to judge) but strict about structure:
//! a missing or misnamed column is a fatal error, not a data-quality
//! problem.

use crate::core::analytics::{AnalyticsSummary, PlotSeries};
use crate::core::sample::{RawRecord, RAW_COLUMNS};
use crate::core::windowing::Window;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// The processed (per-window) CSV column names, in schema order.
pub const WINDOW_COLUMNS: [&str; 9] = [
    "window_start",
    "window_end",
    "sample_count",
    "avg_cpu_total_percent",
    "min_cpu_idle_percent",
    "max_memory_usage_percent",
    "avg_disk_usage_percent",
    "memory_pressure_flag",
    "cpu_saturation_flag",
];

/// Structural dataset errors. Bad values inside a structurally sound file
/// are the validator's business, not an error here.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serialize error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing required column {expected:?} (found: {found:?})")]
    MissingColumn {
        expected: &'static str,
        found: Vec<String>,
    },
}

/// Read the raw metrics CSV into unvalidated records.
///
/// The header must carry all six schema columns in order. Data rows may be
/// short or hold garbage; those fields surface as `None`/raw strings and
/// the validator decides their fate.
pub fn read_raw_csv(path: &Path) -> Result<Vec<RawRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    for (index, expected) in RAW_COLUMNS.into_iter().enumerate() {
        match headers.get(index) {
            Some(actual) if actual == expected => {}
            _ => {
                return Err(DatasetError::MissingColumn {
                    expected,
                    found: headers.iter().map(String::from).collect(),
                })
            }
        }
    }

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        records.push(RawRecord {
            row: index + 1,
            timestamp: field(&record, 0),
            cpu_user_percent: field(&record, 1),
            cpu_system_percent: field(&record, 2),
            cpu_idle_percent: field(&record, 3),
            memory_used_percent: field(&record, 4),
            disk_used_percent: field(&record, 5),
        });
    }

    info!("read {} raw rows from {}", records.len(), path.display());
    Ok(records)
}

fn field(record: &csv::StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Write one window table. An empty table still gets its header row so the
/// artifact is well-formed.
pub fn write_window_csv(path: &Path, windows: &[Window]) -> Result<(), DatasetError> {
    let mut writer = csv::Writer::from_path(path)?;
    if windows.is_empty() {
        writer.write_record(WINDOW_COLUMNS)?;
    }
    for window in windows {
        writer.serialize(window)?;
    }
    writer.flush()?;

    info!("wrote {} windows to {}", windows.len(), path.display());
    Ok(())
}

/// Write one analytics summary as pretty JSON.
pub fn write_summary_json(path: &Path, summary: &AnalyticsSummary) -> Result<(), DatasetError> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;

    info!(
        "wrote {}s analytics summary to {}",
        summary.window_size_seconds,
        path.display()
    );
    Ok(())
}

/// Write the comparative plot series (all window lengths) as pretty JSON.
pub fn write_plot_series_json(path: &Path, series: &[PlotSeries]) -> Result<(), DatasetError> {
    let json = serde_json::to_string_pretty(series)?;
    std::fs::write(path, json)?;

    info!("wrote plot series for {} window lengths to {}", series.len(), path.display());
    Ok(())
}
