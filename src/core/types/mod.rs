/// Byte count with unit conversions used when reporting resident memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> u64 {
        self.0
    }

    pub fn kilobytes(&self) -> f64 {
        self.0 as f64 / 1024.0
    }

    pub fn megabytes(&self) -> f64 {
        self.kilobytes() / 1024.0
    }
}

/// Percentage clamped to `[0, 100]`
///
/// NaN input collapses to `0.0` so a sample never carries a non-finite CPU value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentage(f64);

impl Percentage {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 100.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
