//! Threshold classification for window aggregates.
//!
//! Each window is classified independently of its neighbors: no
//! hysteresis, no debouncing. Both comparisons are strict, so a window
//! sitting exactly on a threshold is not flagged.

use crate::config::Thresholds;

/// True when the window's peak memory usage exceeds the pressure threshold.
pub fn memory_pressure(max_memory_usage_percent: f64, thresholds: &Thresholds) -> bool {
    max_memory_usage_percent > thresholds.memory_pressure_percent
}

/// True when the window's lowest CPU idle drops below the saturation threshold.
pub fn cpu_saturation(min_cpu_idle_percent: f64, thresholds: &Thresholds) -> bool {
    min_cpu_idle_percent < thresholds.cpu_saturation_percent
}
