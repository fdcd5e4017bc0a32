//! proc-telemetry - background process telemetry with pluggable sinks
//!
//! This crate samples the current process on a background thread and publishes
//! each sample to the sinks registered on a telemetry bus. It is meant to be wired
//! into a host's own startup and shutdown sequence.
//!
//! # Features
//!
//! - **Sampler**: one background thread per sampler, idempotent start/stop, joins on stop
//! - **Process counters**: CPU utilisation and resident memory via `getrusage` and
//!   `libproc` on macOS and `sysinfo` elsewhere (Linux, Windows), degrading to
//!   "unavailable" on unsupported platforms
//! - **Frame timing**: externally recorded frame times smoothed with a 0.9/0.1 moving average
//! - **Bus**: append-only sink registry with in-order synchronous fan-out
//! - **Sinks**: batched JSON Lines file, `tracing` events, async channel (`async` feature)
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use proc_telemetry::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let bus = Arc::new(TelemetryBus::new());
//!     let dir = std::env::temp_dir().join("proc_telemetry_doc_example");
//!     let file_sink = Arc::new(JsonFileSink::new(&dir, 1)?);
//!     bus.register_sink(file_sink.clone());
//!
//!     let sampler = Sampler::builder()
//!         .bus(bus)
//!         .config(SamplerConfig { default_sink: None, ..SamplerConfig::default() })
//!         .build();
//!
//!     sampler.start(0.1)?;
//!     sampler.record_frame(16.6);
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//!     sampler.stop();
//!
//!     let samples = read_samples(file_sink.path())?;
//!     assert!(!samples.is_empty());
//!     # drop(file_sink);
//!     # let _ = std::fs::remove_dir_all(dir);
//!     Ok(())
//! }
//! ```
//!
//! # Persisted format
//!
//! [`JsonFileSink`](sink::JsonFileSink) appends one JSON object per line:
//!
//! ```text
//! {"ts":3.01,"seq":3,"cpu":1.7,"mem_mb":21.4,"frame_ms":16.6,"avg_frame_ms":16.4}
//! ```
//!
//! Metrics that could not be measured are written as `-1.0`.
//!
//! # Error Handling
//!
//! Fallible setup (creating a sink directory, spawning the sampler thread, parsing
//! configuration) returns [`Result`]. Once running, nothing in the pipeline returns
//! errors: sinks log and contain their own I/O failures, and unavailable counters
//! show up as unavailable fields.
#![doc(html_root_url = "https://docs.rs/proc-telemetry/0.1.0")]

pub mod bus;
pub mod core;
pub mod counters;
pub mod error;
pub mod logging;
pub mod sampler;
pub mod sink;

pub use error::{Error, Result};

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::bus::TelemetryBus;
    pub use crate::core::metrics::{MetricSample, UNAVAILABLE};
    pub use crate::counters::{default_counter_source, CounterSource, CpuNormalization};
    pub use crate::error::{Error, Result};
    pub use crate::sampler::{FrameStats, Sampler, SamplerConfig};
    #[cfg(feature = "async")]
    pub use crate::sink::{ChannelSink, SampleReceiver, TelemetryMonitoring};
    pub use crate::sink::{read_samples, JsonFileSink, JsonFileSinkConfig, TelemetrySink, TracingSink};
}
