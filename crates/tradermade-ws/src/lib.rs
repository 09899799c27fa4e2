//! Streaming quote feed client for TraderMade
//!
//! Connects to the TraderMade WebSocket feed, authenticates with an API key
//! and symbol list, and delivers quotes to registered handlers.
//!
//! # Features
//!
//! - One background receive loop per connection
//! - Bounded reconnection with a fixed delay between attempts
//! - `disconnect` interrupts any pending retry immediately
//! - Pluggable [`Connector`] for tests and custom transports
//!
//! # Example
//!
//! ```no_run
//! use tradermade_ws::{FeedClient, FeedConfig, FeedHandlers, RetryPolicy, Subscription};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sub = Subscription::from_symbols("stream-key", ["EURUSD", "GBPUSD"]);
//!     let config = FeedConfig::new(sub)
//!         .with_retry(RetryPolicy::new().with_delay(Duration::from_secs(2)));
//!
//!     let client = FeedClient::new(config);
//!     client.set_handlers(
//!         FeedHandlers::new()
//!             .on_quote(|quote, ts| println!("{} {} {}", ts, quote.symbol, quote.mid))
//!             .on_reconnect_attempt(|n| eprintln!("reconnect attempt {}", n)),
//!     );
//!
//!     client.connect().await?;
//!     tokio::signal::ctrl_c().await?;
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod endpoint;
pub mod error;
pub mod hooks;
pub mod reconnect;
pub mod subscription;
pub mod transport;

// Re-export main types
pub use connection::{FeedClient, FeedConfig, FeedState};
pub use endpoint::{Endpoint, FEED_URL};
pub use error::{FeedError, FeedResult};
pub use hooks::{FeedFault, FeedHandlers};
pub use reconnect::RetryPolicy;
pub use subscription::Subscription;
pub use transport::{Connector, FrameSink, FrameStream, TransportError, WsConnector};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockConnector;
