use std::sync::Arc;
use std::time::Duration;

use proc_telemetry::prelude::*;

use crate::common::mocks::sinks::Journal;
use crate::common::{wait_until, RecordingSink, TestSamplerBuilder};

#[test]
fn test_every_sink_sees_every_sample_in_registration_order() -> Result<()> {
    let journal = Journal::default();
    let bus = Arc::new(TelemetryBus::new());
    for label in ["first", "second", "third"] {
        bus.register_sink(Arc::new(RecordingSink::with_journal(label, Arc::clone(&journal))));
    }

    let sampler = TestSamplerBuilder::new().with_bus(Arc::clone(&bus)).build();
    sampler.start(0.005)?;
    assert!(wait_until(Duration::from_secs(5), || journal.lock().len() >= 9));
    sampler.stop();

    let entries = journal.lock().clone();
    assert_eq!(entries.len() % 3, 0);
    for (index, chunk) in entries.chunks(3).enumerate() {
        let labels: Vec<&str> = chunk.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, ["first", "second", "third"]);
        assert!(chunk.iter().all(|(_, sample)| sample.sequence == index as u64));
        assert!(chunk.iter().all(|(_, sample)| *sample == chunk[0].1));
    }
    Ok(())
}

#[test]
fn test_sink_registered_while_running_sees_later_samples() -> Result<()> {
    let bus = Arc::new(TelemetryBus::new());
    let early = Arc::new(RecordingSink::new("early"));
    bus.register_sink(early.clone());

    let sampler = TestSamplerBuilder::new().with_bus(Arc::clone(&bus)).build();
    sampler.start(0.005)?;
    assert!(wait_until(Duration::from_secs(5), || early.samples().len() >= 2));

    let late = Arc::new(RecordingSink::new("late"));
    bus.register_sink(late.clone());
    assert!(wait_until(Duration::from_secs(5), || late.samples().len() >= 2));
    sampler.stop();

    let late_samples = late.samples();
    let first_late = late_samples[0].sequence;
    assert!(first_late >= 2);
    let expected: Vec<u64> = (first_late..first_late + late_samples.len() as u64).collect();
    let actual: Vec<u64> = late_samples.iter().map(|sample| sample.sequence).collect();
    assert_eq!(actual, expected);
    Ok(())
}

#[test]
fn test_samplers_on_separate_buses_do_not_mix() -> Result<()> {
    let left_sink = Arc::new(RecordingSink::new("left"));
    let right_sink = Arc::new(RecordingSink::new("right"));
    let left_bus = Arc::new(TelemetryBus::new());
    let right_bus = Arc::new(TelemetryBus::new());
    left_bus.register_sink(left_sink.clone());
    right_bus.register_sink(right_sink.clone());

    let left = TestSamplerBuilder::new().with_bus(left_bus).build();
    let right = TestSamplerBuilder::new().with_bus(right_bus).build();
    left.start(0.005)?;
    right.start(0.005)?;
    assert!(wait_until(Duration::from_secs(5), || {
        left_sink.samples().len() >= 3 && right_sink.samples().len() >= 3
    }));
    left.stop();
    right.stop();

    for sink in [&left_sink, &right_sink] {
        let sequences: Vec<u64> = sink.samples().iter().map(|sample| sample.sequence).collect();
        let expected: Vec<u64> = (0..sequences.len() as u64).collect();
        assert_eq!(sequences, expected);
    }
    Ok(())
}
