#![allow(dead_code)]

pub mod builders;
pub mod mocks;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub use builders::sampler::TestSamplerBuilder;
pub use mocks::counters::ScriptedCounterSource;
pub use mocks::sinks::RecordingSink;

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Fresh, empty directory path under the system temp dir
pub fn scratch_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "proc_telemetry_it_{label}_{}_{}",
        std::process::id(),
        NEXT_DIR.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Polls `condition` every few milliseconds until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}
