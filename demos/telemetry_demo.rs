use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use proc_telemetry::logging::init_tracing;
use proc_telemetry::prelude::*;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    init_tracing("info,proc_telemetry::sample=debug");

    let dir = std::env::temp_dir().join("proc_telemetry_demo");
    let bus = Arc::new(TelemetryBus::new());
    let file_sink = Arc::new(fresh_file_sink(&dir)?);
    bus.register_sink(file_sink.clone());
    bus.register_sink(Arc::new(TracingSink));

    let sampler = Sampler::builder()
        .bus(Arc::clone(&bus))
        .config(SamplerConfig { default_sink: None, ..SamplerConfig::default() })
        .build();

    println!("Process Telemetry Demo");
    println!("======================");
    println!("Writing samples to {}", file_sink.path().display());

    sampler.start(0.25)?;

    // Simulated render loop with some busy work per frame
    for frame in 0..120u32 {
        let started = std::time::Instant::now();
        let mut acc = 0u64;
        for i in 0..(20_000 + u64::from(frame % 10) * 5_000) {
            acc = acc.wrapping_mul(31).wrapping_add(i);
        }
        std::hint::black_box(acc);
        std::thread::sleep(Duration::from_millis(8));
        sampler.record_frame(started.elapsed().as_secs_f64() * 1000.0);
    }

    sampler.stop();
    bus.flush_all();

    let samples = read_samples(file_sink.path())?;
    println!("\nCollected {} samples:", samples.len());
    for sample in &samples {
        println!(
            "seq {:>3}  t={:>7.3}s  cpu={:>6}  mem={:>8}  frame={:>7}  avg={:>7}",
            sample.sequence,
            sample.timestamp,
            fmt_metric(sample.cpu_percent, "%"),
            fmt_metric(sample.memory_mb, "MB"),
            fmt_metric(sample.frame_time_ms, "ms"),
            fmt_metric(sample.avg_frame_time_ms, "ms"),
        );
    }

    Ok(())
}

/// File sink in `dir` with any log left by an earlier run removed
fn fresh_file_sink(dir: &Path) -> proc_telemetry::Result<JsonFileSink> {
    let sink = JsonFileSink::new(dir, 5)?;
    match std::fs::remove_file(sink.path()) {
        Err(error) if error.kind() != std::io::ErrorKind::NotFound => Err(error.into()),
        _ => Ok(sink),
    }
}

fn fmt_metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(value) => format!("{value:.1}{unit}"),
        None => "n/a".to_string(),
    }
}
