//! End-to-end batch orchestration: read → validate → window → summarize.
//!
//! One synchronous pass per stage over the whole dataset. Window lengths
//! are processed independently of each other; a failure in any stage
//! aborts the run (the caller logs it once and exits non-zero). Data
//! quality problems never surface here; they are dropped and logged
//! inside validation.

use crate::config::Config;
use crate::core::analytics::{self, PlotSeries};
use crate::core::validate::{validate, ValidationStats};
use crate::core::windowing::build_windows;
use crate::dataset::{self, DatasetError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Artifacts produced for one window length.
#[derive(Debug, Clone)]
pub struct WindowSizeOutput {
    pub window_secs: u64,
    pub total_windows: u64,
    pub table_path: PathBuf,
    pub summary_path: PathBuf,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub stats: ValidationStats,
    pub outputs: Vec<WindowSizeOutput>,
    pub plot_series_path: Option<PathBuf>,
}

/// Pipeline-level errors. Each aborts the whole run; there is no partial
/// continuation across stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("invalid window length: {0}s")]
    InvalidWindowLength(u64),
}

/// Run the full pipeline over a raw metrics CSV.
///
/// Writes `processed/metrics_<w>s.csv` and
/// `analytics/analytics_summary_<w>s.json` under `output_dir` for each
/// requested window length, plus `analytics/plot_series.json` when plot
/// output is enabled in the configuration.
pub fn run(
    config: &Config,
    input: &Path,
    output_dir: &Path,
    window_sizes: &[u64],
) -> Result<PipelineReport, PipelineError> {
    if let Some(&bad) = window_sizes.iter().find(|&&w| w == 0) {
        return Err(PipelineError::InvalidWindowLength(bad));
    }

    info!("starting validation stage: {}", input.display());
    let records = dataset::read_raw_csv(input)?;
    let (samples, stats) = validate(records);
    if samples.is_empty() {
        warn!("no valid rows after validation");
    }

    let processed_dir = output_dir.join("processed");
    let analytics_dir = output_dir.join("analytics");
    std::fs::create_dir_all(&processed_dir).map_err(DatasetError::from)?;
    std::fs::create_dir_all(&analytics_dir).map_err(DatasetError::from)?;

    info!("starting transformation stage: {:?} second windows", window_sizes);
    let mut outputs = Vec::with_capacity(window_sizes.len());
    let mut series: Vec<PlotSeries> = Vec::with_capacity(window_sizes.len());

    for &window_secs in window_sizes {
        let windows = build_windows(&samples, window_secs, &config.thresholds);

        let table_path = processed_dir.join(format!("metrics_{window_secs}s.csv"));
        dataset::write_window_csv(&table_path, &windows)?;

        let summary = analytics::summarize(&windows, window_secs);
        analytics::log_summary(&summary, &config.thresholds);

        let summary_path = analytics_dir.join(format!("analytics_summary_{window_secs}s.json"));
        dataset::write_summary_json(&summary_path, &summary)?;

        series.push(analytics::plot_series(&windows, window_secs));
        outputs.push(WindowSizeOutput {
            window_secs,
            total_windows: summary.total_windows,
            table_path,
            summary_path,
        });
    }

    let plot_series_path = if config.plots.default {
        let path = analytics_dir.join("plot_series.json");
        dataset::write_plot_series_json(&path, &series)?;
        Some(path)
    } else {
        None
    };

    Ok(PipelineReport {
        stats,
        outputs,
        plot_series_path,
    })
}
