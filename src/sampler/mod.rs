//! # Background sampler
//!
//! A [`Sampler`] owns one background thread that, once started, builds a
//! [`MetricSample`] every interval and publishes it on its [`TelemetryBus`]. Each
//! sample carries:
//!
//! * a timestamp on the process-wide monotonic clock and a per-sampler sequence number
//! * process CPU utilisation and resident memory from the sampler's [`CounterSource`]
//! * the last frame time passed to [`Sampler::record_frame`] and its moving average
//!
//! ## Lifecycle
//!
//! `Stopped -> Running -> Stopped`. Starting a running sampler and stopping a stopped
//! one are no-ops. [`Sampler::stop`] joins the thread, so no sample is published after
//! it returns. Dropping a sampler stops it.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use proc_telemetry::bus::TelemetryBus;
//! use proc_telemetry::sampler::{Sampler, SamplerConfig};
//! use proc_telemetry::sink::TracingSink;
//!
//! let bus = Arc::new(TelemetryBus::new());
//! bus.register_sink(Arc::new(TracingSink::new()));
//!
//! let sampler = Sampler::builder()
//!     .bus(Arc::clone(&bus))
//!     .config(SamplerConfig { default_sink: None, ..SamplerConfig::default() })
//!     .build();
//!
//! sampler.start(0.05)?;
//! sampler.record_frame(16.7);
//! std::thread::sleep(Duration::from_millis(120));
//! sampler.stop();
//! assert!(sampler.next_sequence() >= 1);
//! # Ok::<(), proc_telemetry::Error>(())
//! ```

mod config;
mod frame;
mod worker;

pub use config::{interval_from_secs, SamplerConfig, DEFAULT_INTERVAL_SECS};
pub use frame::{FrameStats, EMA_HISTORY_WEIGHT, EMA_SAMPLE_WEIGHT};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::bus::TelemetryBus;
use crate::core::metrics::{monotonic_seconds, MetricSample};
use crate::counters::{default_counter_source, CounterSource, ProcessProbe};
use crate::error::{Error, Result};
use worker::Worker;

/// State shared between a sampler handle and its background thread
pub(crate) struct SamplerShared {
    bus: Arc<TelemetryBus>,
    sequence: AtomicU64,
    frames: Mutex<FrameStats>,
    probe: Mutex<ProcessProbe>,
}

impl SamplerShared {
    /// Builds one sample and publishes it
    pub(crate) fn tick(&self) -> MetricSample {
        let timestamp = monotonic_seconds();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let reading = self.probe.lock().read();
        let frames = *self.frames.lock();

        let sample = MetricSample::new(timestamp, sequence)
            .with_cpu_percent(reading.cpu_percent)
            .with_memory_mb(reading.memory_mb)
            .with_frame_times(frames.last_ms, frames.avg_ms);

        self.bus.publish(&sample);
        sample
    }
}

/// Periodic process telemetry producer
pub struct Sampler {
    shared: Arc<SamplerShared>,
    config: SamplerConfig,
    worker: Mutex<Option<Worker>>,
}

impl Sampler {
    /// Creates a sampler publishing on the global bus with the default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> SamplerBuilder {
        SamplerBuilder::default()
    }

    /// Starts sampling every `interval_seconds` (fractional seconds allowed).
    ///
    /// Does nothing if the sampler is already running.
    pub fn start(&self, interval_seconds: f64) -> Result<()> {
        self.start_every(config::interval_from_secs(interval_seconds)?)
    }

    /// Starts sampling at the interval from the sampler's configuration
    pub fn start_default(&self) -> Result<()> {
        self.start_every(self.config.interval()?)
    }

    /// Starts sampling every `interval`.
    ///
    /// Before the thread is spawned the configured default sink is registered on
    /// the bus (once per bus). If that sink cannot be created the sampler still runs.
    pub fn start_every(&self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(Error::invalid_config("sampling interval must be non-zero"));
        }

        let mut worker = self.worker.lock();
        if let Some(running) = worker.as_ref() {
            if !running.is_finished() {
                tracing::debug!("telemetry sampler already running");
                return Ok(());
            }
            if let Some(dead) = worker.take() {
                dead.stop();
            }
        }

        if let Some(sink_config) = &self.config.default_sink {
            self.shared.bus.ensure_default_sink(sink_config);
        }

        self.shared.probe.lock().reset();
        *worker = Some(Worker::spawn(Arc::clone(&self.shared), interval)?);
        tracing::info!(interval_ms = interval.as_secs_f64() * 1000.0, "telemetry sampler started");
        Ok(())
    }

    /// Stops sampling and waits for the background thread to exit.
    ///
    /// Does nothing if the sampler is not running. When called from a sink, i.e. on
    /// the sampler thread itself, the thread is signalled but not joined; it exits
    /// once the current tick returns.
    pub fn stop(&self) {
        let running = self.worker.lock().take();
        if let Some(running) = running {
            running.stop();
            tracing::info!(next_seq = self.next_sequence(), "telemetry sampler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.lock().as_ref().is_some_and(|worker| !worker.is_finished())
    }

    /// Records one frame duration; callable from any thread.
    ///
    /// Negative and non-finite durations are ignored.
    pub fn record_frame(&self, duration_ms: f64) {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            tracing::debug!(duration_ms, "ignoring invalid frame time");
            return;
        }
        self.shared.frames.lock().record(duration_ms);
    }

    /// Snapshot of the last frame time and its moving average
    pub fn frame_stats(&self) -> FrameStats {
        *self.shared.frames.lock()
    }

    /// Sequence number the next sample will carry
    pub fn next_sequence(&self) -> u64 {
        self.shared.sequence.load(Ordering::Relaxed)
    }

    pub fn bus(&self) -> &Arc<TelemetryBus> {
        &self.shared.bus
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("running", &self.is_running())
            .field("next_sequence", &self.next_sequence())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`Sampler`]
#[derive(Default)]
pub struct SamplerBuilder {
    bus: Option<Arc<TelemetryBus>>,
    source: Option<Arc<dyn CounterSource>>,
    config: Option<SamplerConfig>,
}

impl SamplerBuilder {
    /// Bus to publish on; defaults to [`TelemetryBus::global`]
    pub fn bus(mut self, bus: Arc<TelemetryBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Counter source; defaults to the platform source
    pub fn counter_source(mut self, source: Arc<dyn CounterSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn config(mut self, config: SamplerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Sampler {
        let config = self.config.unwrap_or_default();
        let source = self.source.unwrap_or_else(default_counter_source);
        let bus = self.bus.unwrap_or_else(TelemetryBus::global);

        Sampler {
            shared: Arc::new(SamplerShared {
                bus,
                sequence: AtomicU64::new(0),
                frames: Mutex::new(FrameStats::default()),
                probe: Mutex::new(ProcessProbe::new(source, config.cpu_normalization)),
            }),
            config,
            worker: Mutex::new(None),
        }
    }
}
