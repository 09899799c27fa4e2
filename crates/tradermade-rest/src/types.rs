//! Types for TraderMade REST API responses

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Live Rates
// ============================================================================

/// Response of the `live` endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiveRate {
    /// Endpoint name echoed by the server
    pub endpoint: String,
    /// One quote per requested instrument
    pub quotes: Vec<Quote>,
    /// Time the request was served
    pub requested_time: String,
    /// Quote time as Unix seconds
    pub timestamp: i64,
}

/// Live quote for a currency pair or other instrument
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Quote {
    /// Ask price
    pub ask: Decimal,
    /// Bid price
    pub bid: Decimal,
    /// Mid price
    pub mid: Decimal,
    /// Base currency (currency pairs only)
    pub base_currency: Option<String>,
    /// Quote currency (currency pairs only)
    pub quote_currency: Option<String>,
    /// Instrument code (indices and other non-FX instruments)
    pub instrument: Option<String>,
}

impl Quote {
    /// Symbol for display, e.g. `EURUSD` or the instrument code
    pub fn symbol(&self) -> String {
        match (&self.base_currency, &self.quote_currency, &self.instrument) {
            (Some(base), Some(quote), _) => format!("{}{}", base, quote),
            (_, _, Some(instrument)) => instrument.clone(),
            _ => String::new(),
        }
    }

    /// Ask minus bid
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}

// ============================================================================
// Historical Data
// ============================================================================

/// Response of the `minute_historical` and `hour_historical` endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoricalData {
    /// Endpoint name echoed by the server
    pub endpoint: String,
    /// Requested currency pair
    pub currency: String,
    /// Bar time
    pub date_time: String,
    /// Open price
    pub open: Decimal,
    /// High price
    pub high: Decimal,
    /// Low price
    pub low: Decimal,
    /// Close price
    pub close: Decimal,
    /// Time the request was served
    pub request_time: String,
}

/// Response of the daily `historical` endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoricalRate {
    /// Requested date
    pub date: String,
    /// Endpoint name echoed by the server
    pub endpoint: String,
    /// One bar per requested instrument
    pub quotes: Vec<HistoricalQuote>,
    /// Time the request was served
    pub request_time: String,
}

/// Daily bar for one currency pair
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoricalQuote {
    /// Base currency
    pub base_currency: String,
    /// Quote currency
    pub quote_currency: String,
    /// Open price
    pub open: Decimal,
    /// High price
    pub high: Decimal,
    /// Low price
    pub low: Decimal,
    /// Close price
    pub close: Decimal,
}

/// Result of a historical lookup selected by interval name
#[derive(Debug, Clone, PartialEq)]
pub enum Historical {
    /// Single minute bar
    Minute(HistoricalData),
    /// Single hour bar
    Hour(HistoricalData),
    /// Daily bars
    Day(HistoricalRate),
}

// ============================================================================
// Time Series
// ============================================================================

/// Response of the `timeseries` endpoint in `records` format
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeSeriesRate {
    /// Base currency
    pub base_currency: String,
    /// Quote currency
    pub quote_currency: String,
    /// First date in the range
    pub start_date: String,
    /// Last date in the range
    pub end_date: String,
    /// Endpoint name echoed by the server
    pub endpoint: String,
    /// Bars in date order
    pub quotes: Vec<TimeSeriesQuote>,
    /// Time the request was served
    pub request_time: String,
}

/// One bar of a time series
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeSeriesQuote {
    /// Bar date or date-time
    pub date: String,
    /// Open price
    pub open: Decimal,
    /// High price
    pub high: Decimal,
    /// Low price
    pub low: Decimal,
    /// Close price
    pub close: Decimal,
}

// ============================================================================
// Conversion
// ============================================================================

/// Response of the `convert` endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConvertResponse {
    /// Source currency
    pub base_currency: String,
    /// Target currency
    pub quote_currency: String,
    /// Exchange rate used
    pub quote: Decimal,
    /// Converted amount
    pub total: Decimal,
    /// Time the request was served
    pub requested_time: String,
    /// Quote time as Unix seconds
    pub timestamp: i64,
}

// ============================================================================
// Error Bodies
// ============================================================================

/// Error body returned with a non-200 status
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// General error message
    #[serde(default)]
    pub message: String,
    /// Per-field error details
    #[serde(default)]
    pub errors: BTreeMap<String, serde_json::Value>,
}

impl ErrorBody {
    /// True if the body carried no usable detail
    pub fn is_empty(&self) -> bool {
        self.message.is_empty() && self.errors.is_empty()
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(self.errors.len() + 1);
        if !self.message.is_empty() {
            parts.push(self.message.clone());
        }
        for (key, value) in &self.errors {
            match value {
                serde_json::Value::String(text) => parts.push(format!("{}: {}", key, text)),
                other => parts.push(format!("{}: {}", key, other)),
            }
        }
        write!(f, "{}", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_live_rate_parse() {
        let json = r#"{
            "endpoint": "live",
            "quotes": [
                {"ask": 1.08951, "base_currency": "EUR", "bid": 1.0895, "mid": 1.089505, "quote_currency": "USD"},
                {"ask": 15422.5, "bid": 15420.0, "instrument": "UK100", "mid": 15421.25}
            ],
            "requested_time": "Thu, 17 Aug 2023 10:05:12 GMT",
            "timestamp": 1692266712
        }"#;

        let rate: LiveRate = serde_json::from_str(json).unwrap();
        assert_eq!(rate.quotes.len(), 2);
        assert_eq!(rate.quotes[0].symbol(), "EURUSD");
        assert_eq!(rate.quotes[0].bid, dec!(1.0895));
        assert_eq!(rate.quotes[0].spread(), dec!(0.00001));
        assert_eq!(rate.quotes[1].symbol(), "UK100");
        assert_eq!(rate.quotes[1].base_currency, None);
        assert_eq!(rate.timestamp, 1692266712);
    }

    #[test]
    fn test_timeseries_parse() {
        let json = r#"{
            "base_currency": "EUR",
            "end_date": "2024-01-03",
            "endpoint": "timeseries",
            "quote_currency": "USD",
            "quotes": [
                {"close": 1.0942, "date": "2024-01-02", "high": 1.1046, "low": 1.0923, "open": 1.1036},
                {"close": 1.0922, "date": "2024-01-03", "high": 1.0950, "low": 1.0893, "open": 1.0942}
            ],
            "request_time": "Thu, 04 Jan 2024 09:00:00 GMT",
            "start_date": "2024-01-02"
        }"#;

        let series: TimeSeriesRate = serde_json::from_str(json).unwrap();
        assert_eq!(series.quotes.len(), 2);
        assert_eq!(series.quotes[1].close, dec!(1.0922));
    }

    #[test]
    fn test_error_body_display() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"message":"invalid request","errors":{"currency":"unknown pair","period":5}}"#,
        )
        .unwrap();
        assert_eq!(
            body.to_string(),
            "invalid request; currency: unknown pair; period: 5"
        );

        let empty: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
