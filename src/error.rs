//! Error types for the alignment engine

use std::fmt;

/// Errors that can occur during alignment, beat detection or PCM loading
#[derive(Debug, Clone)]
pub enum SyncError {
    /// Invalid input parameters (zero sample rate, mismatched rates, ...)
    InvalidParameter(String),

    /// Two values that must agree by construction did not
    InternalInconsistency(String),

    /// Audio format the loader does not accept
    UnsupportedFormat(String),

    /// Audio decoding error
    DecodingError(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            SyncError::InternalInconsistency(msg) => write!(f, "Internal inconsistency: {}", msg),
            SyncError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            SyncError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<hound::Error> for SyncError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::Unsupported => {
                SyncError::UnsupportedFormat("WAV variant not supported by reader".to_string())
            }
            other => SyncError::DecodingError(other.to_string()),
        }
    }
}
