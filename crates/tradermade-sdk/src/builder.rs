//! Feed client builder
//!
//! Collects symbols, credential, retry settings and handlers, validates them
//! and produces a ready-to-connect [`FeedClient`].
//!
//! # Example
//!
//! ```
//! use tradermade_sdk::builder::FeedBuilder;
//! use std::time::Duration;
//!
//! let builder = FeedBuilder::new(["EURUSD", "GBPUSD"])
//!     .with_api_key("stream-key")
//!     .with_max_attempts(10)
//!     .with_retry_delay(Duration::from_secs(2))
//!     .on_quote(|quote, ts| println!("{} {} {}", ts, quote.symbol, quote.mid));
//!
//! assert!(builder.validate().is_ok());
//! ```

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tradermade_types::{ApiKey, QuoteMessage, StatusNotice, TimestampZone};
use tradermade_ws::{
    Connector, Endpoint, FeedClient, FeedConfig, FeedError, FeedFault, FeedHandlers, RetryPolicy,
    Subscription,
};

/// Configuration validation error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// No symbols specified
    #[error("at least one symbol must be specified")]
    NoSymbols,

    /// Symbol with embedded comma or whitespace
    #[error("invalid symbol: {symbol:?} (expected a single code such as EURUSD)")]
    InvalidSymbol {
        /// Offending symbol
        symbol: String,
    },

    /// No API key given and none in the environment
    #[error("no API key: set one with with_api_key or via {var}")]
    MissingApiKey {
        /// Environment variable that was checked
        var: String,
    },

    /// Timeout too short
    #[error("connection timeout must be at least 1 second")]
    TimeoutTooShort,
}

/// Errors from [`FeedBuilder::connect`]
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Builder settings were rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Connecting failed
    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Builder for a streaming feed client
#[derive(Clone)]
pub struct FeedBuilder {
    /// Symbols to subscribe to
    pub symbols: Vec<String>,

    /// Streaming key; read from `TRADERMADE_STREAM_KEY` when unset
    pub api_key: Option<ApiKey>,

    /// Streaming endpoint
    pub endpoint: Endpoint,

    /// Enable automatic reconnection
    pub reconnect: bool,

    /// Reconnection attempts and delay
    pub retry: RetryPolicy,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Zone for rendered quote timestamps
    pub timestamp_zone: TimestampZone,

    /// Handlers installed before connecting
    pub handlers: FeedHandlers,

    connector: Option<Arc<dyn Connector>>,
}

impl std::fmt::Debug for FeedBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedBuilder")
            .field("symbols", &self.symbols)
            .field("api_key", &self.api_key)
            .field("endpoint", &self.endpoint)
            .field("reconnect", &self.reconnect)
            .field("retry", &self.retry)
            .field("connect_timeout", &self.connect_timeout)
            .field("timestamp_zone", &self.timestamp_zone)
            .field("custom_connector", &self.connector.is_some())
            .finish()
    }
}

impl FeedBuilder {
    /// Create a builder for `symbols`
    pub fn new(symbols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            api_key: None,
            endpoint: Endpoint::Production,
            reconnect: true,
            retry: RetryPolicy::default(),
            connect_timeout: Duration::from_secs(10),
            timestamp_zone: TimestampZone::Utc,
            handlers: FeedHandlers::default(),
            connector: None,
        }
    }

    /// Add a symbol
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbols.push(symbol.into());
        self
    }

    /// Set the streaming API key
    pub fn with_api_key(mut self, api_key: impl Into<ApiKey>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Disable automatic reconnection
    pub fn without_reconnect(mut self) -> Self {
        self.reconnect = false;
        self
    }

    /// Set the whole retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set maximum reconnection attempts
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.retry.max_attempts = max;
        self
    }

    /// Set the delay between reconnection attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry.delay = delay;
        self
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Render quote timestamps in local time instead of UTC
    pub fn with_local_timestamps(mut self) -> Self {
        self.timestamp_zone = TimestampZone::Local;
        self
    }

    /// Use a custom connector instead of WebSocket
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Handle the server's connected notice
    pub fn on_connected<F>(mut self, f: F) -> Self
    where
        F: Fn(&StatusNotice) + Send + Sync + 'static,
    {
        self.handlers = self.handlers.on_connected(f);
        self
    }

    /// Handle quotes
    pub fn on_quote<F>(mut self, f: F) -> Self
    where
        F: Fn(&QuoteMessage, &str) + Send + Sync + 'static,
    {
        self.handlers = self.handlers.on_quote(f);
        self
    }

    /// Handle reconnection attempts
    pub fn on_reconnect_attempt<F>(mut self, f: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.handlers = self.handlers.on_reconnect_attempt(f);
        self
    }

    /// Handle receive loop faults
    pub fn on_fault<F>(mut self, f: F) -> Self
    where
        F: Fn(&FeedFault) + Send + Sync + 'static,
    {
        self.handlers = self.handlers.on_fault(f);
        self
    }

    /// Validate settings that do not depend on the environment
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::NoSymbols);
        }

        for symbol in &self.symbols {
            let trimmed = symbol.trim();
            if trimmed.contains(',') || trimmed.contains(char::is_whitespace) {
                return Err(ConfigError::InvalidSymbol {
                    symbol: symbol.clone(),
                });
            }
        }

        if self.connect_timeout < Duration::from_secs(1) {
            return Err(ConfigError::TimeoutTooShort);
        }

        Ok(())
    }

    /// Validate and build an unconnected client
    pub fn build(self) -> Result<FeedClient, ConfigError> {
        self.validate()?;

        let api_key = match self.api_key {
            Some(key) => key,
            None => ApiKey::stream_from_env().map_err(|_| ConfigError::MissingApiKey {
                var: tradermade_types::STREAM_KEY_ENV.to_string(),
            })?,
        };

        let subscription = Subscription::from_symbols(api_key, &self.symbols);
        debug!(symbols = subscription.symbols(), "Building feed client");

        let mut config = FeedConfig::new(subscription)
            .with_endpoint(self.endpoint)
            .with_retry(self.retry)
            .with_timeout(self.connect_timeout)
            .with_timestamp_zone(self.timestamp_zone);
        if !self.reconnect {
            config = config.without_reconnect();
        }

        let client = match self.connector {
            Some(connector) => FeedClient::with_connector(config, connector),
            None => FeedClient::new(config),
        };
        client.set_handlers(self.handlers);
        Ok(client)
    }

    /// Build the client and connect it
    pub async fn connect(self) -> Result<FeedClient, BuildError> {
        let client = self.build()?;
        client.connect().await?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = FeedBuilder::new(["EURUSD"]);
        assert!(builder.reconnect);
        assert_eq!(builder.retry, RetryPolicy::default());
        assert_eq!(builder.endpoint, Endpoint::Production);
        assert_eq!(builder.timestamp_zone, TimestampZone::Utc);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            FeedBuilder::new(Vec::<String>::new()).validate(),
            Err(ConfigError::NoSymbols)
        ));
        assert!(matches!(
            FeedBuilder::new(["EURUSD,GBPUSD"]).validate(),
            Err(ConfigError::InvalidSymbol { .. })
        ));
        assert!(matches!(
            FeedBuilder::new(["EURUSD"])
                .with_timeout(Duration::from_millis(200))
                .validate(),
            Err(ConfigError::TimeoutTooShort)
        ));
        assert!(FeedBuilder::new([" EURUSD ", "GBPUSD"]).validate().is_ok());
    }

    #[test]
    fn test_build_joins_symbols() {
        let client = FeedBuilder::new(["EURUSD", " GBPUSD"])
            .with_symbol("XAUUSD")
            .with_api_key("k1")
            .build()
            .unwrap();

        assert_eq!(client.subscription().symbols(), "EURUSD,GBPUSD,XAUUSD");
    }

    #[test]
    fn test_retry_settings_reach_client() {
        let client = FeedBuilder::new(["EURUSD"])
            .with_api_key("k1")
            .with_max_attempts(2)
            .with_retry_delay(Duration::from_millis(500))
            .build()
            .unwrap();

        let policy = client.retry_policy();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.delay, Duration::from_millis(500));
    }
}
