//! Error types for codec construction.

use thiserror::Error;

/// Errors raised while declaring a codec (not while decoding values).
#[derive(Debug, Error)]
pub enum CodecError {
    /// A `pattern` refinement is not a valid regular expression.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A `default` value does not decode with the codec it was attached to.
    #[error("default value does not satisfy the {kind} codec: {message}")]
    InvalidDefault { kind: &'static str, message: String },
}

/// Result type for codec construction.
pub type Result<T> = std::result::Result<T, CodecError>;
