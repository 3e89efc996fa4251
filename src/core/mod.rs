//! Core pipeline stages.
//!
//! This module contains:
//! - Sample types shared across stages
//! - Validation of raw rows into clean, ordered samples
//! - Time-window aggregation with threshold flags
//! - Per-window-size analytics summaries

pub mod analytics;
pub mod flags;
pub mod sample;
pub mod validate;
pub mod windowing;

// Re-export commonly used types
pub use analytics::{log_summary, plot_series, summarize, AnalyticsSummary, PlotSeries, TimeRange};
pub use sample::{MetricSample, RawRecord, RAW_COLUMNS};
pub use validate::{validate, FieldStats, ValidationStats, CPU_SUM_TOLERANCE};
pub use windowing::{build_windows, Window};
