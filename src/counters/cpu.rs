use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::types::Percentage;

/// How raw CPU time is normalised into a percentage.
///
/// A process that saturates two cores of a four-core machine reports 50% under
/// [`CpuNormalization::LogicalCpus`] and 100% (clamped) under
/// [`CpuNormalization::SingleCore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuNormalization {
    /// Divide by the logical processor count reported by the counter source
    #[default]
    LogicalCpus,
    /// Report utilisation relative to one core
    SingleCore,
    /// Divide by a fixed processor count
    Fixed(NonZeroUsize),
}

impl CpuNormalization {
    /// Divisor applied to the raw busy/wall ratio
    pub fn divisor(&self, logical_cpus: Option<usize>) -> usize {
        match self {
            CpuNormalization::LogicalCpus => logical_cpus
                .filter(|&count| count > 0)
                .or_else(|| std::thread::available_parallelism().ok().map(NonZeroUsize::get))
                .unwrap_or(1),
            CpuNormalization::SingleCore => 1,
            CpuNormalization::Fixed(count) => count.get(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CpuBaseline {
    cpu_time: Duration,
    wall: Instant,
}

/// Converts successive cumulative CPU time readings into utilisation percentages
#[derive(Debug, Clone, Default)]
pub struct CpuTracker {
    normalization: CpuNormalization,
    baseline: Option<CpuBaseline>,
}

impl CpuTracker {
    pub fn new(normalization: CpuNormalization) -> Self {
        Self { normalization, baseline: None }
    }

    /// Records a cumulative CPU time reading taken at `now`.
    ///
    /// Returns `None` on the first reading (only the baseline is stored) and when no
    /// wall time has passed since the baseline; the baseline is left untouched in the
    /// latter case so the next reading measures the full interval.
    pub fn measure(&mut self, cpu_time: Duration, now: Instant, logical_cpus: Option<usize>) -> Option<f64> {
        let Some(baseline) = self.baseline else {
            self.baseline = Some(CpuBaseline { cpu_time, wall: now });
            return None;
        };

        let wall = now.saturating_duration_since(baseline.wall);
        if wall.is_zero() {
            return None;
        }

        let busy = cpu_time.saturating_sub(baseline.cpu_time);
        self.baseline = Some(CpuBaseline { cpu_time, wall: now });

        let divisor = self.normalization.divisor(logical_cpus) as f64;
        let percent = busy.as_secs_f64() / wall.as_secs_f64() * 100.0 / divisor;
        Some(Percentage::new(percent).value())
    }

    pub fn reset(&mut self) {
        self.baseline = None;
    }

    pub fn normalization(&self) -> CpuNormalization {
        self.normalization
    }
}
