//! Error types for REST API operations

use tradermade_types::ParseError;

/// Errors that can occur during REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-200 status
    #[error("API request failed with status code {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error details from the body, or the raw body
        message: String,
    },

    /// Server answered 200 with an error code in the body
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code reported by the API
        code: i64,
        /// Error message reported by the API
        message: String,
    },

    /// Failed to parse a successful response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
}

impl RestError {
    /// Check if repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Api { .. }
            | Self::Parse(_)
            | Self::InvalidParameter(_)
            | Self::EnvVarNotSet(_) => false,
        }
    }

    /// Check if the server rejected the request as rate limited
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status: 429, .. })
    }
}

impl From<ParseError> for RestError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::EnvVarNotSet(var) => Self::EnvVarNotSet(var),
            other => Self::Parse(other.to_string()),
        }
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;
