//! Re-exports for convenience
//!
//! Import everything you need with:
//! ```
//! use tradermade_sdk::prelude::*;
//! ```

// Builder
pub use crate::builder::{BuildError, ConfigError, FeedBuilder};

// Shared types
pub use tradermade_types::{
    ApiKey, Frame, ParseError, QuoteMessage, StatusNotice, TimestampZone,
};

// Streaming types
pub use tradermade_ws::{
    Endpoint, FeedClient, FeedConfig, FeedError, FeedFault, FeedHandlers, FeedResult, FeedState,
    RetryPolicy, Subscription,
};

// REST types
pub use tradermade_rest::{
    ClientConfig, ConvertResponse, Historical, HistoricalData, HistoricalInterval,
    HistoricalRate, LiveRate, Quote, RestError, RestResult, TimeSeriesInterval, TimeSeriesRate,
    TraderMadeClient,
};

// Decimal for prices
pub use rust_decimal::Decimal;
