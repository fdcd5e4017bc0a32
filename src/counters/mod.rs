//! Process counter acquisition
//!
//! The sampler never talks to the operating system directly. It reads raw counters
//! through a [`CounterSource`]: `getrusage` and `libproc` on macOS, `sysinfo` on
//! Linux, Windows and the other targets it supports, and an
//! [`UnavailableCounterSource`] for everything else. A [`ProcessProbe`] turns
//! those raw counters into the CPU percentage and resident memory figures carried by
//! each sample.
//!
//! ```rust
//! use std::sync::Arc;
//! use proc_telemetry::counters::{CpuNormalization, ProcessProbe, UnavailableCounterSource};
//!
//! let mut probe = ProcessProbe::new(Arc::new(UnavailableCounterSource), CpuNormalization::default());
//! let reading = probe.read();
//! assert_eq!(reading.cpu_percent, None);
//! assert_eq!(reading.memory_mb, None);
//! ```

mod cpu;
#[cfg(unix)]
mod rusage;
#[cfg(not(target_os = "macos"))]
mod sysinfo_source;

pub use cpu::{CpuNormalization, CpuTracker};
#[cfg(unix)]
pub use rusage::RusageCounterSource;
#[cfg(not(target_os = "macos"))]
pub use sysinfo_source::SysinfoCounterSource;

use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(test)]
use mockall::automock;

use crate::core::types::ByteSize;

/// Raw process counters provided by the host platform.
///
/// Every method returns `None` when the platform cannot supply the value; the
/// sampler reports such fields as unavailable instead of failing.
#[cfg_attr(test, automock)]
pub trait CounterSource: Send + Sync {
    /// Total CPU time (user + kernel) consumed by the current process so far
    fn cpu_time(&self) -> Option<Duration>;

    /// Resident set size of the current process in bytes
    fn resident_bytes(&self) -> Option<u64>;

    /// Number of logical processors available to the process
    fn logical_cpus(&self) -> Option<usize>;
}

/// Counter source for platforms without process counter support
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableCounterSource;

impl CounterSource for UnavailableCounterSource {
    fn cpu_time(&self) -> Option<Duration> {
        None
    }

    fn resident_bytes(&self) -> Option<u64> {
        None
    }

    fn logical_cpus(&self) -> Option<usize> {
        None
    }
}

/// Returns the counter source for the platform this crate was built for
pub fn default_counter_source() -> Arc<dyn CounterSource> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(RusageCounterSource)
    }
    #[cfg(not(target_os = "macos"))]
    {
        match SysinfoCounterSource::new() {
            Some(source) => Arc::new(source),
            None => Arc::new(UnavailableCounterSource),
        }
    }
}

/// Derived process metrics for one sampling tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessReading {
    pub cpu_percent: Option<f64>,
    pub memory_mb: Option<f64>,
}

/// Stateful reader that turns raw counters into per-tick process metrics.
///
/// CPU utilisation needs a delta, so the probe keeps the previous CPU time and wall
/// clock baseline between reads. The first read after construction (or after
/// [`ProcessProbe::reset`]) therefore reports CPU as unavailable.
pub struct ProcessProbe {
    source: Arc<dyn CounterSource>,
    cpu: CpuTracker,
}

impl ProcessProbe {
    pub fn new(source: Arc<dyn CounterSource>, normalization: CpuNormalization) -> Self {
        Self { source, cpu: CpuTracker::new(normalization) }
    }

    /// Reads the counters now
    pub fn read(&mut self) -> ProcessReading {
        self.read_at(Instant::now())
    }

    /// Reads the counters, using `now` as the wall clock reference for the CPU delta
    pub fn read_at(&mut self, now: Instant) -> ProcessReading {
        let cpu_percent = match self.source.cpu_time() {
            Some(cpu_time) => self.cpu.measure(cpu_time, now, self.source.logical_cpus()),
            None => None,
        };
        let memory_mb = self.source.resident_bytes().map(|bytes| ByteSize::new(bytes).megabytes());

        ProcessReading { cpu_percent, memory_mb }
    }

    /// Forgets the CPU baseline so the next read starts a fresh delta
    pub fn reset(&mut self) {
        self.cpu.reset();
    }
}

impl std::fmt::Debug for ProcessProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessProbe").field("cpu", &self.cpu).finish_non_exhaustive()
    }
}
