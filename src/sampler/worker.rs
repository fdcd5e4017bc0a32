use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::SamplerShared;

/// Cooperative cancellation token shared between a sampler and its thread
#[derive(Debug, Default)]
pub(crate) struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    pub(crate) fn stop(&self) {
        *self.stopped.lock() = true;
        self.condvar.notify_all();
    }

    pub(crate) fn is_stopped(&self) -> bool {
        *self.stopped.lock()
    }

    /// Sleeps for up to `timeout`, waking early on stop. Returns whether stop was requested.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut stopped = self.stopped.lock();
        while !*stopped {
            let timed_out = match deadline {
                Some(deadline) => self.condvar.wait_until(&mut stopped, deadline).timed_out(),
                None => {
                    self.condvar.wait(&mut stopped);
                    false
                },
            };
            if timed_out {
                break;
            }
        }
        *stopped
    }
}

/// A running sampler thread and the token that stops it
#[derive(Debug)]
pub(crate) struct Worker {
    stop: Arc<StopSignal>,
    handle: JoinHandle<()>,
}

impl Worker {
    pub(crate) fn spawn(shared: Arc<SamplerShared>, interval: Duration) -> std::io::Result<Self> {
        let stop = Arc::new(StopSignal::default());
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("telemetry-sampler".to_string())
            .spawn(move || run(&shared, &thread_stop, interval))?;

        Ok(Self { stop, handle })
    }

    /// Whether the thread has exited on its own (a sink panicked)
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signals the thread and blocks until it has exited.
    ///
    /// Called on the worker thread itself, only signals.
    pub(crate) fn stop(self) {
        self.stop.stop();
        if self.handle.thread().id() == thread::current().id() {
            tracing::debug!("telemetry sampler stopped from its own thread");
            return;
        }
        if self.handle.join().is_err() {
            tracing::warn!("telemetry sampler thread panicked");
        }
    }
}

fn run(shared: &SamplerShared, stop: &StopSignal, interval: Duration) {
    let _exit = scopeguard::guard((), |_| tracing::debug!("telemetry sampler thread exiting"));

    while !stop.is_stopped() {
        let sample = shared.tick();
        tracing::trace!(seq = sample.sequence, ts = sample.timestamp, "published telemetry sample");

        if stop.wait_timeout(interval) {
            break;
        }
    }
}
