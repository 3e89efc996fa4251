//! Non-Linux CPU sampling via `sysinfo`.
//!
//! `sysinfo` only exposes aggregate CPU load, not a user/system/idle time
//! split, so the whole load is attributed to user time and the remainder
//! to idle. Good enough to drive the pipeline on platforms without
//! `/proc/stat`.

use crate::collector::{CollectorError, CpuSplit};
use sysinfo::System;

/// Two-phase CPU sampler: `begin` refreshes the usage baseline, `finish`
/// refreshes again and reads the load measured in between.
pub struct SysinfoSampler {
    sys: System,
}

impl SysinfoSampler {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }

    pub fn begin(&mut self) -> Result<(), CollectorError> {
        self.sys.refresh_cpu_all();
        Ok(())
    }

    pub fn finish(&mut self) -> Result<CpuSplit, CollectorError> {
        self.sys.refresh_cpu_all();
        let usage = f64::from(self.sys.global_cpu_usage()).clamp(0.0, 100.0);
        Ok(CpuSplit {
            user_percent: usage,
            system_percent: 0.0,
            idle_percent: 100.0 - usage,
        })
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_stays_in_range() {
        let mut sampler = SysinfoSampler::new();
        sampler.begin().unwrap();
        let split = sampler.finish().unwrap();

        for v in [split.user_percent, split.system_percent, split.idle_percent] {
            assert!((0.0..=100.0).contains(&v));
        }
        let total = split.user_percent + split.system_percent + split.idle_percent;
        assert!(total <= 100.0 + 1e-9);
    }
}
