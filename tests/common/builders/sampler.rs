use std::sync::Arc;
use std::time::Duration;

use proc_telemetry::bus::TelemetryBus;
use proc_telemetry::counters::{CounterSource, CpuNormalization};
use proc_telemetry::sampler::{Sampler, SamplerConfig};
use proc_telemetry::sink::JsonFileSinkConfig;

use crate::common::mocks::counters::ScriptedCounterSource;

/// Builder for samplers wired to a private bus and a scripted counter source
pub struct TestSamplerBuilder {
    bus: Arc<TelemetryBus>,
    source: Arc<dyn CounterSource>,
    normalization: CpuNormalization,
    default_sink: Option<JsonFileSinkConfig>,
}

impl TestSamplerBuilder {
    /// Create a new TestSamplerBuilder with default values
    pub fn new() -> Self {
        Self {
            bus: Arc::new(TelemetryBus::new()),
            source: Arc::new(ScriptedCounterSource::new(Duration::from_millis(1), Some(16 * 1024 * 1024), Some(2))),
            normalization: CpuNormalization::LogicalCpus,
            default_sink: None,
        }
    }

    /// Set the bus
    pub fn with_bus(mut self, bus: Arc<TelemetryBus>) -> Self {
        self.bus = bus;
        self
    }

    /// Set the counter source
    pub fn with_source(mut self, source: Arc<dyn CounterSource>) -> Self {
        self.source = source;
        self
    }

    /// Set the CPU normalization
    pub fn with_normalization(mut self, normalization: CpuNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Register a default file sink in `config.dir` on first start
    pub fn with_default_sink(mut self, config: JsonFileSinkConfig) -> Self {
        self.default_sink = Some(config);
        self
    }

    /// Build the Sampler instance
    pub fn build(self) -> Sampler {
        Sampler::builder()
            .bus(self.bus)
            .counter_source(self.source)
            .config(SamplerConfig {
                cpu_normalization: self.normalization,
                default_sink: self.default_sink,
                ..SamplerConfig::default()
            })
            .build()
    }
}

impl Default for TestSamplerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
