//! WebSocket transport abstraction
//!
//! The feed client never touches `tokio-tungstenite` directly. A [`Connector`]
//! opens a connection and hands back its two halves: a [`FrameSink`] kept
//! behind the client's session lock and a [`FrameStream`] owned by the
//! receive loop. Splitting the halves lets `disconnect` close the sink while a
//! read is pending.
//!
//! # Example
//!
//! ```no_run
//! use tradermade_ws::transport::{Connector, TransportError, WsConnector};
//!
//! async fn example() -> Result<(), TransportError> {
//!     let connector = WsConnector::new();
//!     let (mut sink, mut stream) = connector
//!         .connect("wss://marketdata.tradermade.com/feedadv")
//!         .await?;
//!     sink.send(r#"{"userKey":"key","symbol":"EURUSD"}"#).await?;
//!     if let Some(frame) = stream.recv().await? {
//!         println!("Received: {}", frame);
//!     }
//!     sink.close().await
//! }
//! ```

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, instrument};

/// Transport layer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Connection timeout
    #[error("connection timeout after {0:?}")]
    Timeout(Duration),

    /// Protocol error
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Outbound half of a connection
#[async_trait]
pub trait FrameSink: Send {
    /// Send a text frame
    async fn send(&mut self, text: &str) -> Result<(), TransportError>;

    /// Close the connection gracefully
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Inbound half of a connection
#[async_trait]
pub trait FrameStream: Send {
    /// Receive the next text frame
    ///
    /// Returns `None` if the peer closed the connection gracefully.
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;
}

/// Boxed outbound half
pub type BoxFrameSink = Box<dyn FrameSink>;

/// Boxed inbound half
pub type BoxFrameStream = Box<dyn FrameStream>;

/// Opens connections to a streaming endpoint
///
/// This trait enables unit testing of the feed client by allowing mock
/// implementations to be injected instead of real WebSocket connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `url` and return the two halves of the connection
    async fn connect(&self, url: &str) -> Result<(BoxFrameSink, BoxFrameStream), TransportError>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Real WebSocket connector using tokio-tungstenite
#[derive(Debug, Clone)]
pub struct WsConnector {
    connect_timeout: Duration,
}

impl Default for WsConnector {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl WsConnector {
    /// Create a connector with a 10 second connect timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[async_trait]
impl Connector for WsConnector {
    #[instrument(skip(self))]
    async fn connect(&self, url: &str) -> Result<(BoxFrameSink, BoxFrameStream), TransportError> {
        debug!("Connecting to WebSocket");

        let (ws_stream, _response) = timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| TransportError::Timeout(self.connect_timeout))?
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        debug!("WebSocket connected");
        let (write, read) = ws_stream.split();
        Ok((Box::new(WsSink { inner: write }), Box::new(WsReader { inner: read })))
    }
}

/// Outbound half of a tungstenite connection
pub struct WsSink {
    inner: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSink for WsSink {
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.inner
            .send(Message::Text(text.to_string()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn close(&mut self) -> Result<(), TransportError> {
        self.inner
            .close()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }
}

/// Inbound half of a tungstenite connection
pub struct WsReader {
    inner: SplitStream<WsStream>,
}

#[async_trait]
impl FrameStream for WsReader {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data)
                        .map(Some)
                        .map_err(|e| TransportError::Protocol(e.to_string()));
                }
                Some(Ok(Message::Close(_))) => return Ok(None),
                // Control frames are answered by tungstenite itself
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e.to_string())),
                None => return Err(TransportError::ConnectionClosed),
            }
        }
    }
}

/// Mock connector for testing
///
/// Each successful `connect` opens a scripted connection. Frames pushed with
/// [`MockConnector::push_frame`] are delivered to the most recent connection,
/// and every frame sent by the client is captured. Clones share state, so a
/// test can keep one handle after giving another to the client.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Clone, Default)]
pub struct MockConnector {
    state: std::sync::Arc<parking_lot::Mutex<MockState>>,
}

#[cfg(any(test, feature = "test-utils"))]
type MockInbound = Result<Option<String>, TransportError>;

#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
struct MockState {
    fail_connect: bool,
    fail_send: bool,
    connects: u32,
    closes: u32,
    sent: Vec<String>,
    inbound: Option<tokio::sync::mpsc::UnboundedSender<MockInbound>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockConnector {
    /// Create a mock connector whose connections succeed
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following connect attempt fail (or succeed again)
    pub fn set_fail_connect(&self, fail: bool) {
        self.state.lock().fail_connect = fail;
    }

    /// Make every following send fail (or succeed again)
    pub fn set_fail_send(&self, fail: bool) {
        self.state.lock().fail_send = fail;
    }

    /// Deliver a text frame to the current connection
    ///
    /// Returns `false` if there is no open connection to deliver to.
    pub fn push_frame(&self, text: impl Into<String>) -> bool {
        self.push(Ok(Some(text.into())))
    }

    /// Simulate a graceful close from the server
    pub fn push_close(&self) -> bool {
        self.push(Ok(None))
    }

    /// Simulate a read error on the current connection
    pub fn push_error(&self, error: TransportError) -> bool {
        self.push(Err(error))
    }

    fn push(&self, item: MockInbound) -> bool {
        match &self.state.lock().inbound {
            Some(tx) => tx.send(item).is_ok(),
            None => false,
        }
    }

    /// Number of connect attempts, successful or not
    pub fn connect_count(&self) -> u32 {
        self.state.lock().connects
    }

    /// Number of times the client closed a connection
    pub fn close_count(&self) -> u32 {
        self.state.lock().closes
    }

    /// All frames the client has sent so far
    pub fn sent_frames(&self) -> Vec<String> {
        self.state.lock().sent.clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _url: &str) -> Result<(BoxFrameSink, BoxFrameStream), TransportError> {
        let mut state = self.state.lock();
        state.connects += 1;
        if state.fail_connect {
            return Err(TransportError::ConnectionFailed("mock connection failure".into()));
        }

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        state.inbound = Some(tx);
        let sink = MockSink {
            state: self.state.clone(),
        };
        Ok((Box::new(sink), Box::new(MockStream { rx })))
    }
}

#[cfg(any(test, feature = "test-utils"))]
struct MockSink {
    state: std::sync::Arc<parking_lot::Mutex<MockState>>,
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl FrameSink for MockSink {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.fail_send {
            return Err(TransportError::SendFailed("mock send failure".into()));
        }
        state.sent.push(text.to_string());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.closes += 1;
        state.inbound = None;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
struct MockStream {
    rx: tokio::sync::mpsc::UnboundedReceiver<MockInbound>,
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl FrameStream for MockStream {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        self.rx
            .recv()
            .await
            .unwrap_or(Err(TransportError::ConnectionClosed))
    }
}
