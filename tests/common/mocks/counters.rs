use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use proc_telemetry::counters::CounterSource;

/// Counter source whose CPU time advances by a fixed step on every read
#[derive(Debug)]
pub struct ScriptedCounterSource {
    cpu_micros: AtomicU64,
    step: Duration,
    resident: Option<u64>,
    logical_cpus: Option<usize>,
}

impl ScriptedCounterSource {
    pub fn new(step: Duration, resident: Option<u64>, logical_cpus: Option<usize>) -> Self {
        Self { cpu_micros: AtomicU64::new(0), step, resident, logical_cpus }
    }

    /// A source that never reports anything, like an unsupported platform
    pub fn unavailable() -> Self {
        Self::new(Duration::ZERO, None, None)
    }

    /// Number of CPU time reads so far
    pub fn reads(&self) -> u64 {
        let step = self.step.as_micros() as u64;
        if step == 0 {
            0
        } else {
            self.cpu_micros.load(Ordering::SeqCst) / step
        }
    }
}

impl CounterSource for ScriptedCounterSource {
    fn cpu_time(&self) -> Option<Duration> {
        if self.step.is_zero() {
            return None;
        }
        let step = self.step.as_micros() as u64;
        let total = self.cpu_micros.fetch_add(step, Ordering::SeqCst) + step;
        Some(Duration::from_micros(total))
    }

    fn resident_bytes(&self) -> Option<u64> {
        self.resident
    }

    fn logical_cpus(&self) -> Option<usize> {
        self.logical_cpus
    }
}
