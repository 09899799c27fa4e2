//! Error types for feed operations

use crate::transport::TransportError;
use tradermade_types::ParseError;

/// Errors returned by `connect` and `disconnect`
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Opening, reading or closing the connection failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The auth frame could not be sent
    ///
    /// The connection stays installed; the receive loop notices the broken
    /// socket and drives reconnection.
    #[error("failed to send credentials: {0}")]
    Auth(#[source] TransportError),

    /// The auth frame could not be encoded
    #[error("failed to encode auth frame: {0}")]
    Encode(#[from] ParseError),

    /// The client was disconnected while connecting
    #[error("connect cancelled by disconnect")]
    Cancelled,
}

impl FeedError {
    /// Returns true if a later connect attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Auth(_))
    }
}

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
