use std::time::Duration;

use parking_lot::Mutex;
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System};

use super::CounterSource;

/// Counter source backed by `sysinfo`.
///
/// Used on every target except macOS, notably Windows, where `sysinfo` reads the
/// process times and working set through the Win32 process APIs.
pub struct SysinfoCounterSource {
    pid: Pid,
    system: Mutex<System>,
}

impl SysinfoCounterSource {
    /// Returns `None` when `sysinfo` cannot inspect processes on this platform
    pub fn new() -> Option<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return None;
        }
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(error) => {
                tracing::debug!(error, "current pid unavailable");
                return None;
            },
        };

        Some(Self { pid, system: Mutex::new(System::new()) })
    }

    fn with_process<T>(&self, kind: ProcessRefreshKind, read: impl FnOnce(&Process) -> T) -> Option<T> {
        let mut system = self.system.lock();
        system.refresh_processes_specifics(ProcessesToUpdate::Some(&[self.pid]), false, kind);
        system.process(self.pid).map(read)
    }
}

impl CounterSource for SysinfoCounterSource {
    fn cpu_time(&self) -> Option<Duration> {
        self.with_process(ProcessRefreshKind::nothing().with_cpu(), |process| {
            Duration::from_millis(process.accumulated_cpu_time())
        })
    }

    fn resident_bytes(&self) -> Option<u64> {
        self.with_process(ProcessRefreshKind::nothing().with_memory(), Process::memory)
    }

    fn logical_cpus(&self) -> Option<usize> {
        std::thread::available_parallelism().ok().map(usize::from)
    }
}

impl std::fmt::Debug for SysinfoCounterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysinfoCounterSource").field("pid", &self.pid).finish_non_exhaustive()
    }
}
