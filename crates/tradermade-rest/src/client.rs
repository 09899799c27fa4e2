//! Main REST client implementation

use crate::endpoints::{HistoryEndpoints, MarketEndpoints, TimeSeriesInterval};
use crate::error::RestResult;
use crate::types::{ConvertResponse, Historical, HistoricalData, HistoricalRate, LiveRate, TimeSeriesRate};
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::info;
use tradermade_types::{ApiKey, REST_KEY_ENV};

/// Production REST base URL
pub const DEFAULT_BASE_URL: &str = "https://marketdata.tradermade.com/api/v1";

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// TraderMade REST API client
///
/// Every request is a single GET; nothing is retried or cached.
///
/// # Example
///
/// ```no_run
/// use tradermade_rest::{TraderMadeClient, TimeSeriesInterval};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = TraderMadeClient::from_env()?;
///
///     let live = client.live_rates(&["EURUSD", "GBPUSD"]).await?;
///     for quote in &live.quotes {
///         println!("{}: {}", quote.symbol(), quote.mid);
///     }
///
///     let interval = TimeSeriesInterval::parse("hourly", Some(4))?;
///     let series = client.timeseries("EURUSD", "2024-01-02", "2024-01-05", interval).await?;
///     println!("{} bars", series.quotes.len());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct TraderMadeClient {
    http_client: Client,
    api_key: ApiKey,
    base_url: String,
}

impl TraderMadeClient {
    /// Create a client with default configuration
    pub fn new(api_key: impl Into<ApiKey>) -> RestResult<Self> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Create a client with the key from `TRADERMADE_API_KEY`
    pub fn from_env() -> RestResult<Self> {
        Self::from_env_var(REST_KEY_ENV)
    }

    /// Create a client with the API key read from `var`
    pub fn from_env_var(var: &str) -> RestResult<Self> {
        Self::new(ApiKey::from_env(var)?)
    }

    /// Create a client with custom configuration
    pub fn with_config(api_key: impl Into<ApiKey>, config: ClientConfig) -> RestResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!(base_url = %base_url, "Created TraderMade REST client");

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Live Rates and Conversion
    // ========================================================================

    /// Get market endpoints
    pub fn market(&self) -> MarketEndpoints<'_> {
        MarketEndpoints::new(&self.http_client, &self.base_url, &self.api_key)
    }

    /// Get live quotes for currency pairs or instruments
    pub async fn live_rates(&self, currencies: &[&str]) -> RestResult<LiveRate> {
        self.market().live_rates(currencies).await
    }

    /// Convert an amount between two currencies
    pub async fn convert(&self, from: &str, to: &str, amount: Decimal) -> RestResult<ConvertResponse> {
        self.market().convert(from, to, amount).await
    }

    // ========================================================================
    // Historical Data
    // ========================================================================

    /// Get historical endpoints
    pub fn history(&self) -> HistoryEndpoints<'_> {
        HistoryEndpoints::new(&self.http_client, &self.base_url, &self.api_key)
    }

    /// Get historical data by interval name (`minute`, `hour` or `day`)
    pub async fn historical(&self, currency: &str, date_time: &str, interval: &str) -> RestResult<Historical> {
        self.history().historical(currency, date_time, interval).await
    }

    /// Get a single minute bar
    pub async fn minute_historical(&self, currency: &str, date_time: &str) -> RestResult<HistoricalData> {
        self.history().minute_historical(currency, date_time).await
    }

    /// Get a single hour bar
    pub async fn hour_historical(&self, currency: &str, date_time: &str) -> RestResult<HistoricalData> {
        self.history().hour_historical(currency, date_time).await
    }

    /// Get daily bars
    pub async fn daily_historical(&self, currency: &str, date: &str) -> RestResult<HistoricalRate> {
        self.history().daily_historical(currency, date).await
    }

    /// Get a time series between two dates
    pub async fn timeseries(
        &self,
        currency: &str,
        start_date: &str,
        end_date: &str,
        interval: TimeSeriesInterval,
    ) -> RestResult<TimeSeriesRate> {
        self.history()
            .timeseries(currency, start_date, end_date, interval)
            .await
    }
}

impl std::fmt::Debug for TraderMadeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraderMadeClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .finish()
    }
}

const DEFAULT_USER_AGENT: &str = concat!("tradermade-rest/", env!("CARGO_PKG_VERSION"));

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Custom user agent
    pub user_agent: Option<String>,
    /// API base URL
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Send requests to another base URL, e.g. a local proxy
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_timeout(30)
            .with_user_agent("test-agent")
            .with_base_url("http://localhost:8080/api/v1/");

        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.user_agent, Some("test-agent".to_string()));

        let client = TraderMadeClient::with_config("k1", config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api/v1");
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_debug_hides_key() {
        let client = TraderMadeClient::new("super-secret").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("marketdata.tradermade.com"));
    }
}
