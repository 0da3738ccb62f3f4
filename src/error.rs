//! Error types for the voiceshift crate.
//!
//! The real-time path never returns errors. Only construction-time
//! configuration and the offline helpers can fail.

use thiserror::Error;

/// Errors that can occur while configuring or driving a processor offline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShiftError {
    /// The processor configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Offline input could not be used.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// I/O error while reading or writing audio.
    #[error("I/O error: {0}")]
    Io(String),
    /// The WAV container was malformed or unsupported.
    #[error("WAV error: {0}")]
    Wav(String),
}

impl From<std::io::Error> for ShiftError {
    fn from(err: std::io::Error) -> Self {
        ShiftError::Io(err.to_string())
    }
}

#[cfg(feature = "wav")]
impl From<hound::Error> for ShiftError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => ShiftError::Io(io.to_string()),
            other => ShiftError::Wav(other.to_string()),
        }
    }
}
