use std::sync::Arc;

use proc_telemetry::prelude::*;
use proc_telemetry::sink::{DEFAULT_FILE_NAME, DEFAULT_FLUSH_EVERY};

use crate::common::scratch_dir;

fn sample(seq: u64) -> MetricSample {
    MetricSample::new(seq as f64 * 0.5, seq).with_cpu_percent(Some(12.5)).with_memory_mb(Some(64.0))
}

#[test]
fn test_batched_writes_survive_drop() -> Result<()> {
    let dir = scratch_dir("batched");
    let path = {
        let sink = JsonFileSink::new(&dir, 4)?;
        for seq in 0..10 {
            sink.accept(&sample(seq));
        }
        assert_eq!(sink.stats().samples_written, 8);
        assert_eq!(sink.buffered(), 2);
        sink.path().to_path_buf()
    };

    let samples = read_samples(&path)?;
    let sequences: Vec<u64> = samples.iter().map(|sample| sample.sequence).collect();
    assert_eq!(sequences, (0..10).collect::<Vec<_>>());
    assert_eq!(samples[3], sample(3));

    let _ = std::fs::remove_dir_all(dir);
    Ok(())
}

#[test]
fn test_config_file_drives_sink_location() -> Result<()> {
    let dir = scratch_dir("config");
    let config: JsonFileSinkConfig = serde_json::from_value(serde_json::json!({
        "dir": dir.join("nested").join("logs"),
    }))?;
    assert_eq!(config.file_name, DEFAULT_FILE_NAME);
    assert_eq!(config.flush_every, DEFAULT_FLUSH_EVERY);

    let sink = JsonFileSink::with_config(config)?;
    sink.accept(&sample(7));
    assert_eq!(sink.path(), dir.join("nested").join("logs").join(DEFAULT_FILE_NAME));
    assert_eq!(read_samples(sink.path())?, vec![sample(7)]);

    drop(sink);
    let _ = std::fs::remove_dir_all(dir);
    Ok(())
}

#[test]
fn test_bus_flush_all_drains_partial_batch() -> Result<()> {
    let dir = scratch_dir("flush_all");
    let bus = TelemetryBus::new();
    let sink = Arc::new(JsonFileSink::new(&dir, 100)?);
    bus.register_sink(sink.clone());

    for seq in 0..5 {
        bus.publish(&sample(seq));
    }
    assert!(read_samples(sink.path()).map(|samples| samples.is_empty()).unwrap_or(true));

    bus.flush_all();
    assert_eq!(read_samples(sink.path())?.len(), 5);
    assert_eq!(sink.buffered(), 0);

    drop(bus);
    drop(sink);
    let _ = std::fs::remove_dir_all(dir);
    Ok(())
}
