//! Streaming endpoint definitions

use std::fmt;

/// Production streaming URL
pub const FEED_URL: &str = "wss://marketdata.tradermade.com/feedadv";

/// TraderMade streaming endpoints
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoint {
    /// Production quote feed (default)
    #[default]
    Production,
    /// Any other URL, e.g. a local relay
    Custom(String),
}

impl Endpoint {
    /// Get the WebSocket URL for this endpoint
    pub fn url(&self) -> &str {
        match self {
            Self::Production => FEED_URL,
            Self::Custom(url) => url,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}
