//! Sysmetrics Pipeline - host resource-utilization analytics.
//!
//! This library turns a raw, timestamped CSV of host utilization samples
//! (CPU user/system/idle, memory used, disk used, all percentages) into
//! cleaned, time-windowed aggregates with pressure/saturation flags and a
//! per-window-size analytics summary.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Sysmetrics Pipeline                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌───────────┐   ┌─────────┐ │
//! │  │ Collector │──▶│ Validate  │──▶│ Windowing │──▶│Analytics│ │
//! │  │ (raw CSV) │   │ (clean +  │   │ (buckets +│   │(summary │ │
//! │  │           │   │  order)   │   │  flags)   │   │ + plots)│ │
//! │  └───────────┘   └───────────┘   └───────────┘   └─────────┘ │
//! │                        │                │              │     │
//! │                        ▼                ▼              ▼     │
//! │                  drop diagnostics   window CSVs   JSON files │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage is a pure, one-shot batch transformation; configuration is
//! loaded once and passed by reference; nothing reads ambient state.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use sysmetrics_pipeline::{config::Config, pipeline};
//!
//! let config = Config::load().expect("configuration");
//! let report = pipeline::run(
//!     &config,
//!     Path::new("data/raw/metrics_collected.csv"),
//!     Path::new("data"),
//!     &config.windows.default,
//! )
//! .expect("pipeline failed");
//!
//! for output in &report.outputs {
//!     println!("{}s: {} windows", output.window_secs, output.total_windows);
//! }
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod dataset;
pub mod pipeline;

// Re-export key types at crate root for convenience
pub use collector::{Collector, CollectorConfig, CollectorError};
pub use config::{Config, Thresholds};
pub use core::{
    build_windows, summarize, validate, AnalyticsSummary, MetricSample, PlotSeries, RawRecord,
    ValidationStats, Window,
};
pub use dataset::DatasetError;
pub use pipeline::{PipelineError, PipelineReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
