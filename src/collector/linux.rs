//! Linux CPU time accounting from `/proc/stat`.
//!
//! The aggregate `cpu` line carries cumulative tick counters per mode;
//! percentages over an interval come from the delta between two reads.
//! `nice` time counts as user, `irq`/`softirq` as system, `iowait` as
//! idle. `steal` contributes to the total only, so the three reported
//! percentages can sum below 100 on a contended guest.

use crate::collector::{CollectorError, CpuSplit};
use std::fs;

/// Cumulative CPU tick counters from the aggregate `cpu` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CpuTicks {
    user: u64,
    nice: u64,
    system: u64,
    idle: u64,
    iowait: u64,
    irq: u64,
    softirq: u64,
    steal: u64,
}

impl CpuTicks {
    fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }
}

/// Two-phase CPU sampler: `begin` records a tick baseline, `finish` reads
/// again and converts the delta into percentages.
pub struct ProcStatSampler {
    baseline: Option<CpuTicks>,
}

impl ProcStatSampler {
    pub fn new() -> Self {
        Self { baseline: None }
    }

    /// Record the tick baseline for the next interval.
    pub fn begin(&mut self) -> Result<(), CollectorError> {
        self.baseline = Some(read_ticks()?);
        Ok(())
    }

    /// Compute the CPU split since the last `begin`.
    pub fn finish(&mut self) -> Result<CpuSplit, CollectorError> {
        let end = read_ticks()?;
        let start = self.baseline.take().unwrap_or(end);
        Ok(split_between(start, end))
    }
}

impl Default for ProcStatSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn read_ticks() -> Result<CpuTicks, CollectorError> {
    let stat = fs::read_to_string("/proc/stat")?;
    stat.lines()
        .find(|line| line.starts_with("cpu "))
        .and_then(parse_cpu_line)
        .ok_or(CollectorError::ProcStat)
}

fn parse_cpu_line(line: &str) -> Option<CpuTicks> {
    let mut fields = line.split_whitespace().skip(1);
    let mut next = || fields.next()?.parse::<u64>().ok();
    Some(CpuTicks {
        user: next()?,
        nice: next()?,
        system: next()?,
        idle: next()?,
        iowait: next().unwrap_or(0),
        irq: next().unwrap_or(0),
        softirq: next().unwrap_or(0),
        steal: next().unwrap_or(0),
    })
}

fn split_between(start: CpuTicks, end: CpuTicks) -> CpuSplit {
    let total = end.total().saturating_sub(start.total());
    if total == 0 {
        // No ticks elapsed between the reads
        return CpuSplit {
            user_percent: 0.0,
            system_percent: 0.0,
            idle_percent: 100.0,
        };
    }
    let pct = |ticks: u64| ticks as f64 / total as f64 * 100.0;

    let user = end.user.saturating_sub(start.user) + end.nice.saturating_sub(start.nice);
    let system = end.system.saturating_sub(start.system)
        + end.irq.saturating_sub(start.irq)
        + end.softirq.saturating_sub(start.softirq);
    let idle = end.idle.saturating_sub(start.idle) + end.iowait.saturating_sub(start.iowait);

    CpuSplit {
        user_percent: pct(user),
        system_percent: pct(system),
        idle_percent: pct(idle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu_line() {
        let ticks =
            parse_cpu_line("cpu  100 10 50 800 20 5 5 10 0 0").expect("should parse");
        assert_eq!(ticks.user, 100);
        assert_eq!(ticks.nice, 10);
        assert_eq!(ticks.system, 50);
        assert_eq!(ticks.idle, 800);
        assert_eq!(ticks.iowait, 20);
        assert_eq!(ticks.steal, 10);
    }

    #[test]
    fn test_parse_short_line() {
        // Very old kernels report only the first four counters.
        let ticks = parse_cpu_line("cpu  100 10 50 800").expect("should parse");
        assert_eq!(ticks.idle, 800);
        assert_eq!(ticks.iowait, 0);
    }

    #[test]
    fn test_parse_garbage_line() {
        assert!(parse_cpu_line("cpu  abc def").is_none());
    }

    #[test]
    fn test_split_between() {
        let start = CpuTicks {
            user: 100,
            nice: 0,
            system: 50,
            idle: 800,
            iowait: 0,
            irq: 0,
            softirq: 0,
            steal: 0,
        };
        let end = CpuTicks {
            user: 130,
            nice: 0,
            system: 60,
            idle: 860,
            iowait: 0,
            irq: 0,
            softirq: 0,
            steal: 0,
        };

        let split = split_between(start, end);
        assert!((split.user_percent - 30.0).abs() < 1e-9);
        assert!((split.system_percent - 10.0).abs() < 1e-9);
        assert!((split.idle_percent - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_sums_to_at_most_100() {
        let start = CpuTicks::default();
        let end = CpuTicks {
            user: 10,
            nice: 5,
            system: 10,
            idle: 60,
            iowait: 5,
            irq: 2,
            softirq: 3,
            steal: 5,
        };

        let split = split_between(start, end);
        let total = split.user_percent + split.system_percent + split.idle_percent;
        assert!(total <= 100.0 + 1e-9);
    }

    #[test]
    fn test_zero_delta() {
        let ticks = CpuTicks::default();
        let split = split_between(ticks, ticks);
        assert_eq!(split.idle_percent, 100.0);
    }

    #[test]
    fn test_reads_local_proc_stat() {
        let mut sampler = ProcStatSampler::new();
        sampler.begin().expect("should read /proc/stat");
        let split = sampler.finish().expect("should read /proc/stat");
        for v in [split.user_percent, split.system_percent, split.idle_percent] {
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
