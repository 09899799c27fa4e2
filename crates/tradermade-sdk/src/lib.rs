//! High-level SDK for TraderMade market data
//!
//! Bundles the streaming quote feed client and the REST client behind one
//! dependency, with a builder for the feed and a prelude for glob imports.
//!
//! # Quick Start
//!
//! ```no_run
//! use tradermade_sdk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Stream quotes
//!     let feed = FeedBuilder::new(["EURUSD", "GBPUSD"])
//!         .with_api_key("stream-key")
//!         .on_quote(|quote, ts| println!("{} {}: {}", ts, quote.symbol, quote.mid))
//!         .connect()
//!         .await?;
//!
//!     // Query REST data
//!     let rest = TraderMadeClient::new("rest-key")?;
//!     let live = rest.live_rates(&["EURUSD"]).await?;
//!     println!("{:?}", live.quotes);
//!
//!     tokio::signal::ctrl_c().await?;
//!     feed.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - **Streaming**: persistent feed with bounded fixed-delay reconnection
//! - **REST**: live, historical, time-series and convert endpoints
//! - **Exact prices**: all prices are `Decimal`

pub mod builder;
pub mod prelude;

// Re-export main types
pub use builder::{BuildError, ConfigError, FeedBuilder};

// Re-export the underlying crates
pub use tradermade_rest as rest;
pub use tradermade_types as types;
pub use tradermade_ws as ws;

pub use tradermade_rest::{RestError, TraderMadeClient};
pub use tradermade_types::{ApiKey, QuoteMessage};
pub use tradermade_ws::{FeedClient, FeedError, FeedState, RetryPolicy};
