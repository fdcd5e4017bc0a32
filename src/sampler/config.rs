use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::counters::CpuNormalization;
use crate::error::{Error, Result};
use crate::sink::JsonFileSinkConfig;

/// Default sampling interval in seconds
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;

/// Configuration for a [`Sampler`](super::Sampler)
///
/// Every field has a default, so a config file only needs the values it changes:
///
/// ```rust
/// use proc_telemetry::sampler::SamplerConfig;
///
/// let config: SamplerConfig = serde_json::from_str(r#"{"interval_secs": 0.25, "default_sink": null}"#).unwrap();
/// assert_eq!(config.interval().unwrap().as_millis(), 250);
/// assert!(config.default_sink.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Seconds between samples used by [`Sampler::start_default`](super::Sampler::start_default)
    pub interval_secs: f64,
    /// How CPU time is turned into a percentage
    pub cpu_normalization: CpuNormalization,
    /// File sink registered on the bus the first time a sampler starts; `None` disables it
    pub default_sink: Option<JsonFileSinkConfig>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            cpu_normalization: CpuNormalization::default(),
            default_sink: Some(JsonFileSinkConfig::default()),
        }
    }
}

impl SamplerConfig {
    /// Loads and validates a JSON config file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: SamplerConfig = serde_json::from_str(&contents)?;
        config.interval()?;
        Ok(config)
    }

    /// The sampling interval as a [`Duration`]
    pub fn interval(&self) -> Result<Duration> {
        interval_from_secs(self.interval_secs)
    }
}

/// Converts a floating point interval in seconds, rejecting zero, negative and non-finite values
pub fn interval_from_secs(secs: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(interval) if !interval.is_zero() => Ok(interval),
        _ => Err(Error::invalid_config(format!("sampling interval must be a positive number of seconds, got {secs}"))),
    }
}
