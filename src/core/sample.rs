//! Sample types shared by the collector and the pipeline stages.
//!
//! `RawRecord` is one CSV row exactly as read (everything optional, nothing
//! parsed); `MetricSample` is a row that passed validation. Timestamps are
//! naive second-precision local times, serialized as `YYYY-MM-DDTHH:MM:SS`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One raw CSV row before any validation.
///
/// Fields are kept as strings so the validator can distinguish "missing"
/// from "present but not numeric" and report each with its own diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based data row number (header excluded), used in diagnostics
    pub row: usize,
    pub timestamp: Option<String>,
    pub cpu_user_percent: Option<String>,
    pub cpu_system_percent: Option<String>,
    pub cpu_idle_percent: Option<String>,
    pub memory_used_percent: Option<String>,
    pub disk_used_percent: Option<String>,
}

/// A fully parsed host-utilization sample.
///
/// Produced by the collector when sampling the local machine, and by the
/// validator from raw CSV rows. Field order matches the raw CSV schema so
/// serializing a sequence of samples reproduces the input format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    #[serde(with = "ts_format")]
    pub timestamp: NaiveDateTime,
    pub cpu_user_percent: f64,
    pub cpu_system_percent: f64,
    pub cpu_idle_percent: f64,
    pub memory_used_percent: f64,
    pub disk_used_percent: f64,
}

/// The raw CSV column names, in schema order.
pub const RAW_COLUMNS: [&str; 6] = [
    "timestamp",
    "cpu_user_percent",
    "cpu_system_percent",
    "cpu_idle_percent",
    "memory_used_percent",
    "disk_used_percent",
];

/// Serde support for second-precision `YYYY-MM-DDTHH:MM:SS` timestamps.
pub mod ts_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_sample_serializes_with_second_precision() {
        let sample = MetricSample {
            timestamp: NaiveDate::from_ymd_opt(2025, 3, 14)
                .unwrap()
                .and_hms_opt(13, 26, 39)
                .unwrap(),
            cpu_user_percent: 12.5,
            cpu_system_percent: 3.0,
            cpu_idle_percent: 84.5,
            memory_used_percent: 40.2,
            disk_used_percent: 55.0,
        };

        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"2025-03-14T13:26:39\""));

        let back: MetricSample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_raw_columns_match_sample_fields() {
        let sample = MetricSample {
            timestamp: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            cpu_user_percent: 0.0,
            cpu_system_percent: 0.0,
            cpu_idle_percent: 0.0,
            memory_used_percent: 0.0,
            disk_used_percent: 0.0,
        };
        let json: serde_json::Value = serde_json::to_value(&sample).unwrap();
        for column in RAW_COLUMNS {
            assert!(json.get(column).is_some(), "missing column {column}");
        }
    }
}
