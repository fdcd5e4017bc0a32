// Core modules
pub mod metrics;
pub mod types;

pub use metrics::{monotonic_seconds, MetricSample, UNAVAILABLE};
pub use types::{ByteSize, Percentage};
