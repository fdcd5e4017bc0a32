//! # Telemetry sinks
//!
//! A sink consumes the samples published on a [`TelemetryBus`](crate::bus::TelemetryBus).
//! Sinks are shared (`Arc<dyn TelemetrySink>`) and called synchronously on the
//! sampler thread, so implementations must be cheap and must never propagate a
//! failure: I/O errors are logged and contained inside the sink.
//!
//! ## Provided sinks
//!
//! * [`JsonFileSink`] - buffered JSON Lines file, flushed in batches
//! * [`TracingSink`] - emits every sample as a structured `tracing` event
//! * [`ChannelSink`] - forwards samples to an async [`SampleReceiver`] (`async` feature)
//!
//! ## Example
//!
//! ```rust
//! use proc_telemetry::core::metrics::MetricSample;
//! use proc_telemetry::sink::TelemetrySink;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! #[derive(Default)]
//! struct CountingSink(AtomicU64);
//!
//! impl TelemetrySink for CountingSink {
//!     fn accept(&self, _sample: &MetricSample) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let sink = CountingSink::default();
//! sink.accept(&MetricSample::new(0.0, 0));
//! assert_eq!(sink.0.load(Ordering::Relaxed), 1);
//! ```

#[cfg(feature = "async")]
mod channel;
mod json_file;
mod tracing_sink;

#[cfg(feature = "async")]
pub use channel::{ChannelSink, SampleReceiver, TelemetryMonitoring, DEFAULT_RECEIVE_TIMEOUT};
pub use json_file::{
    read_samples, FileSinkStats, JsonFileSink, JsonFileSinkConfig, DEFAULT_FILE_NAME, DEFAULT_FLUSH_EVERY,
    DEFAULT_MAX_BUFFERED, DEFAULT_SINK_DIR,
};
pub use tracing_sink::TracingSink;

use crate::core::metrics::MetricSample;

/// Consumer of metric samples
pub trait TelemetrySink: Send + Sync {
    /// Accepts one sample. Must not panic or block indefinitely.
    fn accept(&self, sample: &MetricSample);

    /// Pushes any buffered samples to their destination
    fn flush(&self) {}

    /// Human-readable sink name used in log output
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
