use super::TelemetrySink;
use crate::core::metrics::MetricSample;

/// Emits each sample as a `DEBUG` event on the `proc_telemetry::sample` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl TelemetrySink for TracingSink {
    fn accept(&self, sample: &MetricSample) {
        tracing::debug!(
            target: "proc_telemetry::sample",
            seq = sample.sequence,
            ts = sample.timestamp,
            cpu = ?sample.cpu_percent,
            mem_mb = ?sample.memory_mb,
            frame_ms = ?sample.frame_time_ms,
            avg_frame_ms = ?sample.avg_frame_time_ms,
            "telemetry sample"
        );
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
