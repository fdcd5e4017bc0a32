#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl Error {
    pub(crate) fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Error::InvalidConfig(msg.into())
    }

    #[cfg_attr(not(feature = "async"), allow(dead_code))]
    pub(crate) fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }
}

/// Result type for proc-telemetry operations
pub type Result<T> = std::result::Result<T, Error>;
