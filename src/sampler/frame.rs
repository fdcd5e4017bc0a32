/// Weight given to the running average when a new frame time is folded in
pub const EMA_HISTORY_WEIGHT: f64 = 0.9;
/// Weight given to the newly recorded frame time
pub const EMA_SAMPLE_WEIGHT: f64 = 0.1;

/// Last recorded frame time and its exponential moving average
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub last_ms: Option<f64>,
    pub avg_ms: Option<f64>,
}

impl FrameStats {
    /// Folds one frame duration into the stats.
    ///
    /// The first recording seeds the average; after that
    /// `avg = avg * 0.9 + duration * 0.1`.
    pub fn record(&mut self, duration_ms: f64) {
        self.last_ms = Some(duration_ms);
        self.avg_ms = Some(match self.avg_ms {
            None => duration_ms,
            Some(avg) => avg * EMA_HISTORY_WEIGHT + duration_ms * EMA_SAMPLE_WEIGHT,
        });
    }
}
