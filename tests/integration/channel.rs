use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use proc_telemetry::prelude::*;

use crate::common::TestSamplerBuilder;

#[tokio::test]
async fn test_channel_streams_live_samples() -> Result<()> {
    let bus = Arc::new(TelemetryBus::new());
    let (sink, receiver) = ChannelSink::bounded(64);
    bus.register_sink(Arc::new(sink));

    let sampler = TestSamplerBuilder::new().with_bus(bus).build();
    sampler.start(0.005)?;

    let samples: Vec<MetricSample> = tokio::time::timeout(Duration::from_secs(5), receiver.take(3).collect())
        .await
        .map_err(|_| Error::Timeout("stream did not yield three samples".into()))?;
    sampler.stop();

    let sequences: Vec<u64> = samples.iter().map(|sample| sample.sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
    Ok(())
}

#[tokio::test]
async fn test_monitoring_reports_closed_feed() -> Result<()> {
    let bus = Arc::new(TelemetryBus::new());
    let (sink, mut receiver) = ChannelSink::bounded(8);
    bus.register_sink(Arc::new(sink));

    let sampler = TestSamplerBuilder::new().with_bus(Arc::clone(&bus)).build();
    sampler.start(0.005)?;
    let first = receiver.next_sample().await?;
    assert_eq!(first.sequence, 0);
    sampler.stop();

    drop(sampler);
    drop(bus);
    while receiver.try_recv().is_some() {}
    assert!(matches!(receiver.next_sample().await, Err(Error::ChannelClosed)));
    Ok(())
}
