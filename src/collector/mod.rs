//! Local host metric collection.
//!
//! Samples CPU, memory, and disk utilization at a fixed cadence and
//! appends one row per sample to the raw metrics CSV, the same file
//! format the pipeline later validates. CPU time accounting comes from
//! `/proc/stat` deltas on Linux; other platforms fall back to the
//! aggregate load reported by `sysinfo`.

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(not(target_os = "linux"))]
pub mod fallback;

#[cfg(target_os = "linux")]
pub use linux::ProcStatSampler;

/// Platform CPU sampler type alias
#[cfg(target_os = "linux")]
pub type CpuSampler = ProcStatSampler;

#[cfg(not(target_os = "linux"))]
pub use fallback::SysinfoSampler;

/// Platform CPU sampler type alias
#[cfg(not(target_os = "linux"))]
pub type CpuSampler = SysinfoSampler;

use crate::core::sample::MetricSample;
use chrono::Timelike;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use sysinfo::{Disks, System};
use thiserror::Error;
use tracing::info;

/// CPU time split over one sampling interval, as percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuSplit {
    pub user_percent: f64,
    pub system_percent: f64,
    pub idle_percent: f64,
}

/// Configuration for one collection run.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Path for the raw metrics CSV
    pub output_path: PathBuf,
    /// Total collection duration in seconds
    pub duration_secs: u64,
    /// Seconds between samples
    pub interval_secs: u64,
}

/// Errors that can occur during metric collection.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("unexpected /proc/stat format")]
    ProcStat,
    #[error("sampling interval must be positive")]
    InvalidInterval,
}

/// Samples the local host and writes the raw metrics CSV.
pub struct Collector {
    config: CollectorConfig,
    cpu: CpuSampler,
    sys: System,
    disks: Disks,
    stop: Arc<AtomicBool>,
}

impl Collector {
    /// Create a collector for the given run configuration.
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            config,
            cpu: CpuSampler::new(),
            sys: System::new(),
            disks: Disks::new_with_refreshed_list(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the run at the next interval boundary (e.g. from a
    /// Ctrl+C handler).
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Run the collection loop.
    ///
    /// Takes `ceil(duration / interval)` samples; each CPU split is
    /// measured across the sleep preceding its row. Rows are flushed as
    /// they are written, so an interrupted run leaves a readable CSV.
    pub fn run(&mut self) -> Result<PathBuf, CollectorError> {
        if self.config.interval_secs == 0 {
            return Err(CollectorError::InvalidInterval);
        }
        let samples =
            (self.config.duration_secs + self.config.interval_secs - 1) / self.config.interval_secs;

        info!(
            "collecting {} samples every {}s to {}",
            samples,
            self.config.interval_secs,
            self.config.output_path.display()
        );

        let mut writer = csv::Writer::from_path(&self.config.output_path)?;
        let mut written = 0u64;

        for _ in 0..samples {
            self.cpu.begin()?;
            if !self.sleep_interval() {
                info!("collection interrupted");
                break;
            }
            let split = self.cpu.finish()?;

            let sample = MetricSample {
                timestamp: now_seconds(),
                cpu_user_percent: split.user_percent,
                cpu_system_percent: split.system_percent,
                cpu_idle_percent: split.idle_percent,
                memory_used_percent: self.memory_used_percent(),
                disk_used_percent: self.disk_used_percent(),
            };
            writer.serialize(&sample)?;
            writer.flush()?;
            written += 1;
        }

        info!("collected {} samples", written);
        Ok(self.config.output_path.clone())
    }

    /// Sleep one interval, waking early if the stop flag is raised.
    /// Returns false when the run was interrupted.
    fn sleep_interval(&self) -> bool {
        let deadline = Instant::now() + Duration::from_secs(self.config.interval_secs);
        while Instant::now() < deadline {
            if self.stop.load(Ordering::SeqCst) {
                return false;
            }
            thread::sleep(Duration::from_millis(100));
        }
        !self.stop.load(Ordering::SeqCst)
    }

    fn memory_used_percent(&mut self) -> f64 {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return 0.0;
        }
        let used = total.saturating_sub(self.sys.available_memory());
        used as f64 / total as f64 * 100.0
    }

    /// Usage of the root filesystem, or the first listed disk when no
    /// mount point is literally "/" (non-unix platforms).
    fn disk_used_percent(&mut self) -> f64 {
        self.disks.refresh(false);
        let disk = self
            .disks
            .list()
            .iter()
            .find(|d| d.mount_point() == std::path::Path::new("/"))
            .or_else(|| self.disks.list().first());
        match disk {
            Some(d) if d.total_space() > 0 => {
                let used = d.total_space().saturating_sub(d.available_space());
                used as f64 / d.total_space() as f64 * 100.0
            }
            _ => 0.0,
        }
    }
}

/// Current local time truncated to whole seconds.
fn now_seconds() -> chrono::NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
