//! # Publication bus
//!
//! The [`TelemetryBus`] is the fan-out point between samplers and sinks. Sinks are
//! registered once and never removed; every published sample is handed to each of
//! them in registration order, synchronously, on the publishing thread.
//!
//! Most code should construct a bus and share it explicitly (`Arc<TelemetryBus>`).
//! [`TelemetryBus::global`] provides a lazily created process-wide instance for hosts
//! that want a single bus without threading it through their startup code.
//!
//! ```rust
//! use std::sync::Arc;
//! use proc_telemetry::bus::TelemetryBus;
//! use proc_telemetry::core::metrics::MetricSample;
//! use proc_telemetry::sink::TracingSink;
//!
//! let bus = TelemetryBus::new();
//! bus.register_sink(Arc::new(TracingSink::new()));
//! bus.publish(&MetricSample::new(0.0, 0));
//! assert_eq!(bus.sink_count(), 1);
//! ```
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::RwLock;

use crate::core::metrics::MetricSample;
use crate::sink::{JsonFileSink, JsonFileSinkConfig, TelemetrySink};

static GLOBAL_BUS: Lazy<Arc<TelemetryBus>> = Lazy::new(|| Arc::new(TelemetryBus::new()));

/// Append-only registry of sinks with synchronous fan-out
#[derive(Default)]
pub struct TelemetryBus {
    sinks: RwLock<Vec<Arc<dyn TelemetrySink>>>,
    default_sink: OnceCell<()>,
}

impl TelemetryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide bus, created on first access and never dropped
    pub fn global() -> Arc<TelemetryBus> {
        Arc::clone(&GLOBAL_BUS)
    }

    /// Adds a sink; it receives every sample published from now on
    pub fn register_sink(&self, sink: Arc<dyn TelemetrySink>) {
        tracing::debug!(sink = sink.name(), "registering telemetry sink");
        self.sinks.write().push(sink);
    }

    /// Hands `sample` to every registered sink in registration order.
    ///
    /// The sink list is snapshotted first, so the registry lock is not held while
    /// sinks run and a sink may register further sinks without deadlocking.
    pub fn publish(&self, sample: &MetricSample) {
        let sinks = self.sinks.read().clone();
        for sink in &sinks {
            sink.accept(sample);
        }
    }

    /// Asks every sink to push out buffered samples
    pub fn flush_all(&self) {
        let sinks = self.sinks.read().clone();
        for sink in &sinks {
            sink.flush();
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    /// Registers a [`JsonFileSink`] built from `config`, at most once per bus.
    ///
    /// Only the first call does anything; later calls return `false` without
    /// touching the file system. If the sink cannot be created the failure is
    /// logged and the attempt still counts, so a broken log directory is reported
    /// once instead of on every sampler start.
    pub fn ensure_default_sink(&self, config: &JsonFileSinkConfig) -> bool {
        let mut registered = false;
        self.default_sink.get_or_init(|| {
            match JsonFileSink::with_config(config.clone()) {
                Ok(sink) => {
                    tracing::info!(path = %sink.path().display(), "registered default telemetry sink");
                    self.register_sink(Arc::new(sink));
                    registered = true;
                },
                Err(error) => {
                    tracing::warn!(dir = %config.dir.display(), %error, "default telemetry sink unavailable");
                },
            }
        });
        registered
    }
}

impl std::fmt::Debug for TelemetryBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sinks = self.sinks.read();
        let names: Vec<&str> = sinks.iter().map(|sink| sink.name()).collect();
        f.debug_struct("TelemetryBus").field("sinks", &names).finish()
    }
}
