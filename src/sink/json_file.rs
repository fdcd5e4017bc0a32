use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::TelemetrySink;
use crate::core::metrics::MetricSample;
use crate::error::{Error, Result};

/// Directory the default sink writes to, relative to the working directory
pub const DEFAULT_SINK_DIR: &str = "runtime_intelligence/logs/core";
/// File the JSON sink appends to inside its directory
pub const DEFAULT_FILE_NAME: &str = "core_metrics.json";
/// Number of buffered samples that triggers a flush
pub const DEFAULT_FLUSH_EVERY: usize = 1;
/// Upper bound on samples retained while the file cannot be written
pub const DEFAULT_MAX_BUFFERED: usize = 4096;

/// Configuration for [`JsonFileSink`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonFileSinkConfig {
    /// Directory holding the log file; created if missing
    pub dir: PathBuf,
    /// Name of the log file inside `dir`
    pub file_name: String,
    /// Flush once this many samples are buffered (0 behaves as 1)
    pub flush_every: usize,
    /// Oldest samples are dropped beyond this many unflushed samples
    pub max_buffered: usize,
}

impl Default for JsonFileSinkConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_SINK_DIR),
            file_name: DEFAULT_FILE_NAME.to_string(),
            flush_every: DEFAULT_FLUSH_EVERY,
            max_buffered: DEFAULT_MAX_BUFFERED,
        }
    }
}

/// Counters describing what a [`JsonFileSink`] has done so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileSinkStats {
    /// Flushes that had buffered samples to write
    pub flushes: u64,
    /// Lines successfully appended to the file
    pub samples_written: u64,
    /// Flushes that stopped early because of an I/O or serialization error
    pub write_errors: u64,
    /// Samples discarded because the buffer exceeded its bound
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct SinkState {
    buffer: Vec<MetricSample>,
    stats: FileSinkStats,
}

/// Append-only JSON Lines sink with batched flushing.
///
/// Samples are buffered in memory and appended to `<dir>/<file_name>` once
/// `flush_every` of them are pending, one JSON object per line:
///
/// ```text
/// {"ts":12.5,"seq":3,"cpu":4.2,"mem_mb":38.1,"frame_ms":16.6,"avg_frame_ms":16.9}
/// ```
///
/// A flush writes as many lines as it can. Lines already appended stay written;
/// if a write fails part way the remaining samples stay buffered and are retried
/// on the next flush. The sink flushes one last time when dropped.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    flush_every: usize,
    max_buffered: usize,
    state: Mutex<SinkState>,
}

impl JsonFileSink {
    /// Creates a sink writing [`DEFAULT_FILE_NAME`] inside `dir`
    pub fn new<P: AsRef<Path>>(dir: P, flush_every: usize) -> Result<Self> {
        Self::with_config(JsonFileSinkConfig {
            dir: dir.as_ref().to_path_buf(),
            flush_every,
            ..JsonFileSinkConfig::default()
        })
    }

    /// Creates a sink from an explicit configuration, creating the directory if needed
    pub fn with_config(config: JsonFileSinkConfig) -> Result<Self> {
        if config.file_name.is_empty() {
            return Err(Error::invalid_config("json sink file name must not be empty"));
        }

        fs::create_dir_all(&config.dir)?;

        let flush_every = config.flush_every.max(1);
        let path = config.dir.join(&config.file_name);
        tracing::debug!(path = %path.display(), flush_every, "json telemetry sink ready");

        Ok(Self {
            path,
            flush_every,
            max_buffered: config.max_buffered.max(flush_every),
            state: Mutex::new(SinkState::default()),
        })
    }

    /// Full path of the file this sink appends to
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush_every(&self) -> usize {
        self.flush_every
    }

    /// Number of samples waiting for the next flush
    pub fn buffered(&self) -> usize {
        self.state.lock().buffer.len()
    }

    pub fn stats(&self) -> FileSinkStats {
        self.state.lock().stats
    }

    /// Flushes the buffer, returning how many lines were written.
    ///
    /// An empty buffer is a no-op that does not touch the file.
    pub fn try_flush(&self) -> Result<usize> {
        let mut state = self.state.lock();
        self.flush_locked(&mut state)
    }

    fn flush_locked(&self, state: &mut SinkState) -> Result<usize> {
        if state.buffer.is_empty() {
            return Ok(0);
        }

        state.stats.flushes += 1;
        let outcome = append_lines(&self.path, &state.buffer);
        state.buffer.drain(..outcome.written);
        state.stats.samples_written += outcome.written as u64;

        match outcome.error {
            None => Ok(outcome.written),
            Some(error) => {
                state.stats.write_errors += 1;
                Err(error)
            },
        }
    }
}

impl TelemetrySink for JsonFileSink {
    fn accept(&self, sample: &MetricSample) {
        let mut state = self.state.lock();
        state.buffer.push(*sample);

        if state.buffer.len() > self.max_buffered {
            let excess = state.buffer.len() - self.max_buffered;
            state.buffer.drain(..excess);
            state.stats.dropped += excess as u64;
            tracing::warn!(path = %self.path.display(), dropped = excess, "telemetry buffer full, dropping oldest samples");
        }

        if state.buffer.len() >= self.flush_every {
            if let Err(error) = self.flush_locked(&mut state) {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    retained = state.buffer.len(),
                    "failed to flush telemetry samples"
                );
            }
        }
    }

    fn flush(&self) {
        if let Err(error) = self.try_flush() {
            tracing::warn!(path = %self.path.display(), %error, "failed to flush telemetry samples");
        }
    }

    fn name(&self) -> &str {
        "json-file"
    }
}

impl Drop for JsonFileSink {
    fn drop(&mut self) {
        TelemetrySink::flush(self);
    }
}

pub(super) struct AppendOutcome {
    pub(super) written: usize,
    pub(super) error: Option<Error>,
}

/// Append target that can cut off a partially written line
pub(super) trait LineTarget: Write {
    /// Current size of the target in bytes
    fn size(&mut self) -> io::Result<u64>;

    /// Shrinks the target back to `size` bytes
    fn truncate_to(&mut self, size: u64) -> io::Result<()>;
}

impl LineTarget for File {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, size: u64) -> io::Result<()> {
        self.set_len(size)
    }
}

fn append_lines(path: &Path, samples: &[MetricSample]) -> AppendOutcome {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(mut file) => write_lines(&mut file, samples),
        Err(error) => AppendOutcome { written: 0, error: Some(error.into()) },
    }
}

/// Writes one line per sample, stopping at the first failure.
///
/// A line that fails part way is truncated away, so the target only ever holds
/// whole lines and the failed sample can be written again later.
pub(super) fn write_lines<T: LineTarget>(target: &mut T, samples: &[MetricSample]) -> AppendOutcome {
    let mut end = match target.size() {
        Ok(len) => len,
        Err(error) => return AppendOutcome { written: 0, error: Some(error.into()) },
    };

    for (written, sample) in samples.iter().enumerate() {
        let line = match serde_json::to_string(sample) {
            Ok(mut line) => {
                line.push('\n');
                line
            },
            Err(error) => return AppendOutcome { written, error: Some(error.into()) },
        };
        if let Err(error) = target.write_all(line.as_bytes()) {
            if let Err(truncate_error) = target.truncate_to(end) {
                tracing::warn!(%truncate_error, size = end, "failed to discard partial telemetry line");
            }
            return AppendOutcome { written, error: Some(error.into()) };
        }
        end += line.len() as u64;
    }

    AppendOutcome { written: samples.len(), error: None }
}

/// Reads every sample from a JSON Lines file written by [`JsonFileSink`].
///
/// Blank lines are skipped; any malformed line fails the whole read.
pub fn read_samples<P: AsRef<Path>>(path: P) -> Result<Vec<MetricSample>> {
    let reader = BufReader::new(File::open(path)?);
    let mut samples = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        samples.push(serde_json::from_str(&line)?);
    }

    Ok(samples)
}
