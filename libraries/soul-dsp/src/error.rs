/// DSP chain errors
use thiserror::Error;

/// Result type alias using `DspError`
pub type Result<T> = std::result::Result<T, DspError>;

/// DSP chain error types
///
/// Only configuration can fail. Block processing never returns an error.
#[derive(Error, Debug)]
pub enum DspError {
    /// Input format the chain cannot decode
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The chain was released and cannot be configured again
    #[error("DSP chain has been released")]
    Released,

    /// Settings could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings (de)serialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for DspError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<DspError> for soul_core::SoulError {
    fn from(err: DspError) -> Self {
        match err {
            DspError::Config(msg) => soul_core::SoulError::config(msg),
            DspError::Io(io) => soul_core::SoulError::Io(io),
            DspError::Serialization(json) => soul_core::SoulError::Serialization(json),
            other => soul_core::SoulError::audio(other.to_string()),
        }
    }
}
