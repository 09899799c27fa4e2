//! REST API client for TraderMade market data
//!
//! # Features
//!
//! - **Live**: current bid/ask/mid for currency pairs and instruments
//! - **Historical**: minute, hour and daily bars for a point in time
//! - **Time series**: daily, hourly or minute bars over a date range
//! - **Convert**: currency conversion at the live rate
//!
//! Requests are authenticated with an API key passed as the `api_key` query
//! parameter.
//!
//! # Example
//!
//! ```no_run
//! use tradermade_rest::TraderMadeClient;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TraderMadeClient::new("your-api-key")?;
//!
//!     let live = client.live_rates(&["EURUSD"]).await?;
//!     println!("{:?}", live.quotes);
//!
//!     let converted = client.convert("EUR", "GBP", Decimal::new(1000, 0)).await?;
//!     println!("1000 EUR = {} GBP", converted.total);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod endpoints;
pub mod error;
pub mod types;

// Re-export main types
pub use client::{ClientConfig, TraderMadeClient, DEFAULT_BASE_URL};
pub use endpoints::{HistoricalInterval, TimeSeriesInterval};
pub use error::{RestError, RestResult};

pub use types::{
    // Live
    LiveRate, Quote,
    // Historical
    Historical, HistoricalData, HistoricalQuote, HistoricalRate,
    // Time series
    TimeSeriesQuote, TimeSeriesRate,
    // Conversion
    ConvertResponse,
};
