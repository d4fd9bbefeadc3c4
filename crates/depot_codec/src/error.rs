//! Error types for the codec crate.

use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Failed to encode a value.
    #[error("encoding failed: {message}")]
    Encode {
        /// Description of the encoding error.
        message: String,
    },

    /// The payload was not produced by this codec, or is corrupt.
    ///
    /// This is deliberately distinct from [`CodecError::Io`]: a readable
    /// stream whose bytes do not match the expected format (wrong adapter,
    /// truncated gzip member, malformed JSON) lands here, never as garbage
    /// data.
    #[error("format mismatch: {message}")]
    FormatMismatch {
        /// Description of what failed to parse.
        message: String,
    },

    /// An I/O error occurred while reading or writing the stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Creates an encoding error.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates a format mismatch error.
    pub fn format_mismatch(message: impl Into<String>) -> Self {
        Self::FormatMismatch {
            message: message.into(),
        }
    }
}
