//! Shared types for the TraderMade market data APIs
//!
//! This crate holds the credential, streaming frame and timestamp types used
//! by both the streaming feed client and the REST client. It has no
//! networking dependencies.
//!
//! # Key Types
//!
//! - [`ApiKey`] - Secret-wrapped API credential
//! - [`QuoteMessage`], [`StatusNotice`] - Streaming frames
//! - [`Frame`] - Classified inbound frame
//! - [`AuthRequest`] - Auth handshake sent after connecting
//! - [`TimestampZone`] - Rendering of quote timestamps
//! - [`ParseError`] - Error types

pub mod credential;
pub mod error;
pub mod stream;
pub mod time;

// Re-export commonly used types
pub use credential::*;
pub use error::*;
pub use stream::*;
pub use time::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
