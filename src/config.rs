//! Configuration for the metrics pipeline.
//!
//! Loaded once at startup and passed by reference into every stage; the
//! core never reads configuration from ambient state. A missing file falls
//! back to the built-in defaults. A file that does exist must carry every
//! section, so a truncated config fails at startup rather than half-applying.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main configuration: window lengths, flag thresholds, plot output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub windows: WindowConfig,
    pub thresholds: Thresholds,
    pub plots: PlotConfig,
}

/// Window lengths (seconds) used when the CLI does not override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub default: Vec<u64>,
}

/// Cutoffs used to classify each window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// A window is under memory pressure when its max memory usage exceeds
    /// this (strict)
    pub memory_pressure_percent: f64,
    /// A window is CPU-saturated when its min idle drops below this
    /// (strict)
    pub cpu_saturation_percent: f64,
}

/// Whether to write the comparative plot-series artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    pub default: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            windows: WindowConfig::default(),
            thresholds: Thresholds::default(),
            plots: PlotConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default: vec![30, 60],
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            memory_pressure_percent: 90.0,
            cpu_saturation_percent: 10.0,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self { default: true }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path.
    ///
    /// A missing file yields the defaults; a file that exists but cannot
    /// be parsed is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sysmetrics")
            .join("config.json")
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.windows.default, vec![30, 60]);
        assert_eq!(config.thresholds.memory_pressure_percent, 90.0);
        assert_eq!(config.thresholds.cpu_saturation_percent, 10.0);
        assert!(config.plots.default);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = Config {
            windows: WindowConfig {
                default: vec![10, 120],
            },
            thresholds: Thresholds {
                memory_pressure_percent: 80.0,
                cpu_saturation_percent: 15.0,
            },
            plots: PlotConfig { default: false },
        };

        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_section_is_an_error() {
        let json = r#"{"windows": {"default": [60]}, "plots": {"default": true}}"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("does-not-exist.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
