//! Feed handlers
//!
//! Handlers are plain callbacks invoked synchronously from the receive loop,
//! in frame arrival order. A slow handler delays every frame behind it, so
//! keep them fast or forward work to a channel.
//!
//! # Example
//!
//! ```
//! use tradermade_ws::hooks::FeedHandlers;
//!
//! let handlers = FeedHandlers::new()
//!     .on_connected(|notice| {
//!         println!("Connected: {}", notice.message);
//!     })
//!     .on_quote(|quote, timestamp| {
//!         println!("{} bid={} ask={} at {}", quote.symbol, quote.bid, quote.ask, timestamp);
//!     })
//!     .on_reconnect_attempt(|attempt| {
//!         println!("Reconnecting (attempt {})", attempt);
//!     });
//! ```

use std::fmt;
use std::sync::Arc;
use tradermade_types::{QuoteMessage, StatusNotice};

/// Problems detected inside the receive loop
///
/// None of these reach the caller of `connect`; they are only visible through
/// [`FeedHandlers::on_fault`] and log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFault {
    /// The connection failed or was closed by the server
    Transport(String),
    /// A JSON frame matched no known shape and was dropped
    Malformed {
        /// Raw frame text
        raw: String,
        /// Decoder error
        reason: String,
    },
    /// A quote carried an unusable timestamp and was dropped
    InvalidTimestamp {
        /// Symbol of the dropped quote
        symbol: String,
        /// Timestamp text as received
        ts: String,
    },
    /// Every reconnection attempt failed; the feed is stopped
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
    },
}

/// Callback for connected notices
pub type ConnectedHandler = Arc<dyn Fn(&StatusNotice) + Send + Sync>;
/// Callback for quotes, with the rendered timestamp
pub type QuoteHandler = Arc<dyn Fn(&QuoteMessage, &str) + Send + Sync>;
/// Callback for reconnection attempts (1-indexed)
pub type ReconnectHandler = Arc<dyn Fn(u32) + Send + Sync>;
/// Callback for receive loop faults
pub type FaultHandler = Arc<dyn Fn(&FeedFault) + Send + Sync>;

/// Handler slots for a feed client
///
/// All slots are optional.
#[derive(Clone, Default)]
pub struct FeedHandlers {
    pub(crate) connected: Option<ConnectedHandler>,
    pub(crate) quote: Option<QuoteHandler>,
    pub(crate) reconnect_attempt: Option<ReconnectHandler>,
    pub(crate) fault: Option<FaultHandler>,
}

impl fmt::Debug for FeedHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedHandlers")
            .field("connected", &self.connected.as_ref().map(|_| "..."))
            .field("quote", &self.quote.as_ref().map(|_| "..."))
            .field("reconnect_attempt", &self.reconnect_attempt.as_ref().map(|_| "..."))
            .field("fault", &self.fault.as_ref().map(|_| "..."))
            .finish()
    }
}

impl FeedHandlers {
    /// Create an empty handler set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for the server's connected notice
    pub fn on_connected<F>(mut self, f: F) -> Self
    where
        F: Fn(&StatusNotice) + Send + Sync + 'static,
    {
        self.connected = Some(Arc::new(f));
        self
    }

    /// Register a callback for quote updates
    ///
    /// The second argument is the quote time as `YYYY-MM-DD HH:MM:SS.mmm`.
    pub fn on_quote<F>(mut self, f: F) -> Self
    where
        F: Fn(&QuoteMessage, &str) + Send + Sync + 'static,
    {
        self.quote = Some(Arc::new(f));
        self
    }

    /// Register a callback for reconnection attempts
    ///
    /// Called before each attempt with the attempt number (1-indexed).
    pub fn on_reconnect_attempt<F>(mut self, f: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.reconnect_attempt = Some(Arc::new(f));
        self
    }

    /// Register a callback for receive loop faults
    pub fn on_fault<F>(mut self, f: F) -> Self
    where
        F: Fn(&FeedFault) + Send + Sync + 'static,
    {
        self.fault = Some(Arc::new(f));
        self
    }

    pub(crate) fn invoke_connected(&self, notice: &StatusNotice) {
        if let Some(ref hook) = self.connected {
            hook(notice);
        }
    }

    pub(crate) fn invoke_quote(&self, quote: &QuoteMessage, timestamp: &str) {
        if let Some(ref hook) = self.quote {
            hook(quote, timestamp);
        }
    }

    pub(crate) fn invoke_reconnect_attempt(&self, attempt: u32) {
        if let Some(ref hook) = self.reconnect_attempt {
            hook(attempt);
        }
    }

    pub(crate) fn invoke_fault(&self, fault: &FeedFault) {
        if let Some(ref hook) = self.fault {
            hook(fault);
        }
    }
}
