use std::time::Duration;

use super::CounterSource;

/// Counter source backed by `getrusage(2)` and `sysconf(3)`.
///
/// Resident memory comes from the `libproc` task info on macOS; other unix targets
/// report it as unavailable and use `SysinfoCounterSource` instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct RusageCounterSource;

impl CounterSource for RusageCounterSource {
    fn cpu_time(&self) -> Option<Duration> {
        // SAFETY: `rusage` is plain old data and `getrusage` only writes into it.
        let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
        if rc != 0 {
            tracing::debug!(error = %std::io::Error::last_os_error(), "getrusage failed");
            return None;
        }

        Some(timeval_to_duration(usage.ru_utime) + timeval_to_duration(usage.ru_stime))
    }

    fn resident_bytes(&self) -> Option<u64> {
        resident_bytes()
    }

    fn logical_cpus(&self) -> Option<usize> {
        // SAFETY: `sysconf` is thread-safe for this query and has no side effects.
        let count = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        usize::try_from(count).ok().filter(|&count| count > 0)
    }
}

fn timeval_to_duration(tv: libc::timeval) -> Duration {
    let secs = u64::try_from(tv.tv_sec).unwrap_or(0);
    let micros = u64::try_from(tv.tv_usec).unwrap_or(0);
    Duration::from_secs(secs) + Duration::from_micros(micros)
}

#[cfg(target_os = "macos")]
fn resident_bytes() -> Option<u64> {
    use libproc::libproc::proc_pid::pidinfo;
    use libproc::libproc::task_info::TaskInfo;

    let pid = i32::try_from(std::process::id()).ok()?;
    match pidinfo::<TaskInfo>(pid, 0) {
        Ok(info) => Some(info.pti_resident_size),
        Err(error) => {
            tracing::debug!(%error, "proc_pidinfo task info failed");
            None
        },
    }
}

#[cfg(not(target_os = "macos"))]
fn resident_bytes() -> Option<u64> {
    None
}
