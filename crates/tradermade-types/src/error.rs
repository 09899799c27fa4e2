//! Error types for decoding TraderMade payloads

use thiserror::Error;

/// Errors raised while decoding wire data or loading credentials
#[derive(Error, Debug)]
pub enum ParseError {
    /// Payload is not valid JSON for the expected shape
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String, raw: Option<String> },

    /// Quote timestamp is not a base-10 millisecond count
    #[error("Invalid timestamp {value:?}: expected milliseconds since epoch")]
    InvalidTimestamp { value: String },

    /// Millisecond value cannot be represented as a calendar time
    #[error("Timestamp out of range: {millis}")]
    TimestampOutOfRange { millis: i64 },

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
}

impl ParseError {
    /// Create an invalid JSON error, keeping the offending payload
    pub fn invalid_json(err: &serde_json::Error, raw: impl Into<String>) -> Self {
        Self::InvalidJson {
            message: err.to_string(),
            raw: Some(raw.into()),
        }
    }
}

/// Result type for decoding operations
pub type ParseResult<T> = Result<T, ParseError>;
