//! API credential handling
//!
//! Keys are held in a [`SecretString`] so they are zeroized on drop and never
//! show up in `Debug` output or log lines.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;

use crate::error::{ParseError, ParseResult};

/// Environment variable read by [`ApiKey::rest_from_env`]
pub const REST_KEY_ENV: &str = "TRADERMADE_API_KEY";

/// Environment variable read by [`ApiKey::stream_from_env`]
pub const STREAM_KEY_ENV: &str = "TRADERMADE_STREAM_KEY";

/// TraderMade API key
///
/// REST and streaming access use separate keys on the TraderMade side, but
/// both are opaque strings and share this type.
#[derive(Clone)]
pub struct ApiKey(Arc<SecretString>);

impl ApiKey {
    /// Wrap a key
    pub fn new(key: impl Into<String>) -> Self {
        Self(Arc::new(SecretString::from(key.into())))
    }

    /// Read a key from the given environment variable
    pub fn from_env(var: &str) -> ParseResult<Self> {
        let key = std::env::var(var).map_err(|_| ParseError::EnvVarNotSet(var.to_string()))?;
        if key.trim().is_empty() {
            return Err(ParseError::EnvVarNotSet(var.to_string()));
        }
        Ok(Self::new(key))
    }

    /// Read the REST key from `TRADERMADE_API_KEY`
    pub fn rest_from_env() -> ParseResult<Self> {
        Self::from_env(REST_KEY_ENV)
    }

    /// Read the streaming key from `TRADERMADE_STREAM_KEY`
    pub fn stream_from_env() -> ParseResult<Self> {
        Self::from_env(STREAM_KEY_ENV)
    }

    /// Access the raw key
    ///
    /// Only call this when building a request or auth frame.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}
