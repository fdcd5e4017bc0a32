//! # Metric samples
//!
//! A [`MetricSample`] is one immutable snapshot of process performance counters,
//! produced by the sampler on every tick and handed to each registered sink.
//!
//! Fields that could not be measured are `None` in memory and are written as the
//! [`UNAVAILABLE`] sentinel when serialized, so the persisted log never has gaps:
//!
//! ```rust
//! use proc_telemetry::core::metrics::MetricSample;
//!
//! let sample = MetricSample::new(1.5, 0).with_memory_mb(Some(12.0));
//! let line = serde_json::to_string(&sample).unwrap();
//! assert_eq!(
//!     line,
//!     r#"{"ts":1.5,"seq":0,"cpu":-1.0,"mem_mb":12.0,"frame_ms":-1.0,"avg_frame_ms":-1.0}"#
//! );
//! ```
use std::time::Instant;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Value written in place of a metric that could not be measured
pub const UNAVAILABLE: f64 = -1.0;

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Seconds elapsed since the process-wide monotonic epoch.
///
/// The epoch is fixed the first time any caller asks for it, so timestamps from
/// every sampler in the process share one time base and never go backwards.
pub fn monotonic_seconds() -> f64 {
    EPOCH.elapsed().as_secs_f64()
}

/// One timestamped snapshot of process performance counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Seconds since the monotonic epoch
    #[serde(rename = "ts")]
    pub timestamp: f64,
    /// Position of this sample in its sampler's stream
    #[serde(rename = "seq")]
    pub sequence: u64,
    /// Process CPU utilisation in `[0, 100]`
    #[serde(rename = "cpu", with = "sentinel")]
    pub cpu_percent: Option<f64>,
    /// Resident set size in megabytes
    #[serde(rename = "mem_mb", with = "sentinel")]
    pub memory_mb: Option<f64>,
    /// Last externally recorded frame duration
    #[serde(rename = "frame_ms", with = "sentinel")]
    pub frame_time_ms: Option<f64>,
    /// Exponential moving average of recorded frame durations
    #[serde(rename = "avg_frame_ms", with = "sentinel")]
    pub avg_frame_time_ms: Option<f64>,
}

impl MetricSample {
    /// Creates a sample with every measured field unavailable
    pub fn new(timestamp: f64, sequence: u64) -> Self {
        Self {
            timestamp,
            sequence,
            cpu_percent: None,
            memory_mb: None,
            frame_time_ms: None,
            avg_frame_time_ms: None,
        }
    }

    pub fn with_cpu_percent(mut self, cpu_percent: Option<f64>) -> Self {
        self.cpu_percent = cpu_percent;
        self
    }

    pub fn with_memory_mb(mut self, memory_mb: Option<f64>) -> Self {
        self.memory_mb = memory_mb;
        self
    }

    pub fn with_frame_times(mut self, frame_time_ms: Option<f64>, avg_frame_time_ms: Option<f64>) -> Self {
        self.frame_time_ms = frame_time_ms;
        self.avg_frame_time_ms = avg_frame_time_ms;
        self
    }
}

/// Maps `None` to [`UNAVAILABLE`] on the way out and any negative value back to `None`.
mod sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::UNAVAILABLE;

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.unwrap_or(UNAVAILABLE))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Ok((value >= 0.0).then_some(value))
    }
}
