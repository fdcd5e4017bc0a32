use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::TelemetrySink;
use crate::core::metrics::MetricSample;
use crate::error::{Error, Result};

/// How long [`TelemetryMonitoring::next_sample`] waits before giving up
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Forwards samples from the sampler thread into an async [`SampleReceiver`].
///
/// The channel is bounded. When the receiver falls behind, new samples are dropped
/// (and counted) rather than blocking the sampler.
///
/// ```rust
/// use proc_telemetry::core::metrics::MetricSample;
/// use proc_telemetry::sink::{ChannelSink, TelemetrySink};
///
/// let (sink, mut receiver) = ChannelSink::bounded(8);
/// sink.accept(&MetricSample::new(0.0, 0));
/// assert_eq!(receiver.try_recv().map(|s| s.sequence), Some(0));
/// ```
#[derive(Debug)]
pub struct ChannelSink {
    sender: mpsc::Sender<MetricSample>,
    dropped: AtomicU64,
}

impl ChannelSink {
    /// Creates a sink and its receiver with room for `capacity` in-flight samples
    pub fn bounded(capacity: usize) -> (Self, SampleReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender, dropped: AtomicU64::new(0) }, SampleReceiver { receiver })
    }

    /// Samples discarded because the channel was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl TelemetrySink for ChannelSink {
    fn accept(&self, sample: &MetricSample) {
        match self.sender.try_send(*sample) {
            Ok(()) => {},
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(seq = sample.sequence, "telemetry channel full, sample dropped");
            },
            Err(TrySendError::Closed(_)) => {
                tracing::trace!(seq = sample.sequence, "telemetry receiver dropped");
            },
        }
    }

    fn name(&self) -> &str {
        "channel"
    }
}

/// Receiving half of a [`ChannelSink`], usable directly or as a [`Stream`]
#[derive(Debug)]
pub struct SampleReceiver {
    receiver: mpsc::Receiver<MetricSample>,
}

impl SampleReceiver {
    /// Waits for the next sample; `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<MetricSample> {
        self.receiver.recv().await
    }

    /// Returns a sample if one is already queued
    pub fn try_recv(&mut self) -> Option<MetricSample> {
        self.receiver.try_recv().ok()
    }

    /// Waits up to `timeout` for the next sample
    pub async fn next_sample_within(&mut self, timeout: Duration) -> Result<MetricSample> {
        tokio::time::timeout(timeout, self.receiver.recv())
            .await
            .map_err(|_| Error::timeout(format!("no telemetry sample within {timeout:?}")))?
            .ok_or(Error::ChannelClosed)
    }
}

impl Stream for SampleReceiver {
    type Item = MetricSample;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

/// Async access to a live telemetry feed
#[async_trait]
pub trait TelemetryMonitoring: Send {
    /// Gets the next sample, failing if none arrives within [`DEFAULT_RECEIVE_TIMEOUT`]
    async fn next_sample(&mut self) -> Result<MetricSample>;
}

#[async_trait]
impl TelemetryMonitoring for SampleReceiver {
    async fn next_sample(&mut self) -> Result<MetricSample> {
        self.next_sample_within(DEFAULT_RECEIVE_TIMEOUT).await
    }
}
