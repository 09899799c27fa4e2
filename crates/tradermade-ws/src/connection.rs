//! Feed connection management
//!
//! [`FeedClient`] owns at most one live connection. `connect` opens it,
//! spawns the receive loop and sends the auth frame. When the receive loop
//! sees the connection fail it tears the session down and, with
//! auto-reconnect enabled, retries inline on its own task until it succeeds,
//! runs out of attempts, or `disconnect` fires the cancellation gate.

use crate::endpoint::Endpoint;
use crate::error::{FeedError, FeedResult};
use crate::hooks::{FeedFault, FeedHandlers};
use crate::reconnect::RetryPolicy;
use crate::subscription::Subscription;
use crate::transport::{BoxFrameSink, BoxFrameStream, Connector, TransportError, WsConnector};

use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tradermade_types::{Frame, QuoteMessage, StatusNotice, TimestampZone};

/// Feed connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// Not connected
    Disconnected,
    /// Connection in progress
    Connecting,
    /// Connected and authenticated (auth frame sent)
    Connected,
    /// Reconnecting after the connection was lost
    Reconnecting {
        /// Current attempt (1-indexed)
        attempt: u32,
    },
    /// Reconnection attempts exhausted
    Stopped,
}

/// Configuration for a feed client
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Streaming endpoint
    pub endpoint: Endpoint,
    /// Instruments and credential, resent on every connect
    pub subscription: Subscription,
    /// Reconnection attempts and delay
    pub retry: RetryPolicy,
    /// Reconnect automatically when the connection is lost
    pub auto_reconnect: bool,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Zone used for rendered quote timestamps
    pub timestamp_zone: TimestampZone,
}

impl FeedConfig {
    /// Create a config for `subscription` with default values
    pub fn new(subscription: Subscription) -> Self {
        Self {
            endpoint: Endpoint::Production,
            subscription,
            retry: RetryPolicy::default(),
            auto_reconnect: true,
            connect_timeout: Duration::from_secs(10),
            timestamp_zone: TimestampZone::Utc,
        }
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Disable automatic reconnection
    pub fn without_reconnect(mut self) -> Self {
        self.auto_reconnect = false;
        self
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the zone for rendered quote timestamps
    pub fn with_timestamp_zone(mut self, zone: TimestampZone) -> Self {
        self.timestamp_zone = zone;
        self
    }
}

/// Streaming quote feed client
///
/// Cloning is cheap and every clone drives the same connection.
///
/// # Example
///
/// ```no_run
/// use tradermade_ws::{FeedClient, FeedConfig, Subscription};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let sub = Subscription::new("stream-key", "EURUSD,GBPUSD");
///     let client = FeedClient::new(FeedConfig::new(sub));
///
///     client.set_quote_handler(|quote, timestamp| {
///         println!("{} {} / {} at {}", quote.symbol, quote.bid, quote.ask, timestamp);
///     });
///
///     client.connect().await?;
///     tokio::signal::ctrl_c().await?;
///     client.disconnect().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct FeedClient {
    inner: Arc<Inner>,
}

struct Inner {
    endpoint: Endpoint,
    subscription: Subscription,
    timestamp_zone: TimestampZone,
    connector: Arc<dyn Connector>,
    retry: RwLock<RetryPolicy>,
    auto_reconnect: AtomicBool,
    handlers: RwLock<FeedHandlers>,
    state: RwLock<FeedState>,
    /// The live connection; creation, writes and teardown happen under this lock
    session: Mutex<Option<Session>>,
    /// Cancellation gate for reconnection; replaced once it has fired
    stop: parking_lot::Mutex<CancellationToken>,
    next_session_id: AtomicU64,
}

struct Session {
    id: u64,
    sink: BoxFrameSink,
    /// Fired on teardown so the receive loop stops waiting on a read
    closed: CancellationToken,
}

impl Session {
    async fn close(mut self) -> Result<(), TransportError> {
        self.closed.cancel();
        self.sink.close().await
    }
}

impl FeedClient {
    /// Create a client that connects over WebSocket
    pub fn new(config: FeedConfig) -> Self {
        let connector = WsConnector::new().with_timeout(config.connect_timeout);
        Self::with_connector(config, Arc::new(connector))
    }

    /// Create a client using a custom connector
    pub fn with_connector(config: FeedConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            inner: Arc::new(Inner {
                endpoint: config.endpoint,
                subscription: config.subscription,
                timestamp_zone: config.timestamp_zone,
                connector,
                retry: RwLock::new(config.retry),
                auto_reconnect: AtomicBool::new(config.auto_reconnect),
                handlers: RwLock::new(FeedHandlers::default()),
                state: RwLock::new(FeedState::Disconnected),
                session: Mutex::new(None),
                stop: parking_lot::Mutex::new(CancellationToken::new()),
                next_session_id: AtomicU64::new(0),
            }),
        }
    }

    /// Get the current state
    pub fn state(&self) -> FeedState {
        *self.inner.state.read()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.state() == FeedState::Connected
    }

    /// The subscription sent on every connect
    pub fn subscription(&self) -> &Subscription {
        &self.inner.subscription
    }

    /// Current retry policy
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry.read().clone()
    }

    /// Replace the retry policy
    ///
    /// Takes effect the next time the connection is lost.
    pub fn set_retry_policy(&self, policy: RetryPolicy) {
        *self.inner.retry.write() = policy;
    }

    /// Enable or disable automatic reconnection
    pub fn set_auto_reconnect(&self, enabled: bool) {
        self.inner.auto_reconnect.store(enabled, Ordering::Relaxed);
    }

    /// Replace all handlers at once
    pub fn set_handlers(&self, handlers: FeedHandlers) {
        *self.inner.handlers.write() = handlers;
    }

    /// Set the handler for the server's connected notice
    pub fn set_connected_handler<F>(&self, f: F)
    where
        F: Fn(&StatusNotice) + Send + Sync + 'static,
    {
        self.inner.handlers.write().connected = Some(Arc::new(f));
    }

    /// Set the handler for quotes
    pub fn set_quote_handler<F>(&self, f: F)
    where
        F: Fn(&QuoteMessage, &str) + Send + Sync + 'static,
    {
        self.inner.handlers.write().quote = Some(Arc::new(f));
    }

    /// Set the handler for reconnection attempts
    pub fn set_reconnect_handler<F>(&self, f: F)
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.inner.handlers.write().reconnect_attempt = Some(Arc::new(f));
    }

    /// Set the handler for receive loop faults
    pub fn set_fault_handler<F>(&self, f: F)
    where
        F: Fn(&FeedFault) + Send + Sync + 'static,
    {
        self.inner.handlers.write().fault = Some(Arc::new(f));
    }

    /// Connect, start the receive loop and send the auth frame
    ///
    /// Does nothing if a connection already exists. If the auth frame cannot
    /// be sent the error is returned but the connection stays installed.
    pub async fn connect(&self) -> FeedResult<()> {
        let gate = self.inner.arm_stop_gate();
        self.inner.establish(&gate).await
    }

    /// Stop reconnection attempts and close the connection
    ///
    /// Safe to call repeatedly. A later `connect` starts a fresh session.
    pub async fn disconnect(&self) -> FeedResult<()> {
        self.inner.stop.lock().cancel();

        let mut slot = self.inner.session.lock().await;
        *self.inner.state.write() = FeedState::Disconnected;

        match slot.take() {
            Some(session) => {
                info!(session = session.id, "Disconnecting from feed");
                session.close().await?;
                Ok(())
            }
            None => {
                debug!("Disconnect requested with no open connection");
                Ok(())
            }
        }
    }
}

impl fmt::Debug for FeedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedClient")
            .field("endpoint", &self.inner.endpoint)
            .field("symbols", &self.inner.subscription.symbols())
            .field("state", &self.state())
            .finish()
    }
}

impl Inner {
    /// Current gate, or a fresh one if the last was fired by `disconnect`
    fn arm_stop_gate(&self) -> CancellationToken {
        let mut stop = self.stop.lock();
        if stop.is_cancelled() {
            debug!("Issuing new cancellation gate");
            *stop = CancellationToken::new();
        }
        stop.clone()
    }

    fn handlers(&self) -> FeedHandlers {
        self.handlers.read().clone()
    }

    async fn establish(self: &Arc<Self>, gate: &CancellationToken) -> FeedResult<()> {
        let mut slot = self.session.lock().await;
        if slot.is_some() {
            debug!("Already connected, skipping connect");
            *self.state.write() = FeedState::Connected;
            return Ok(());
        }
        if gate.is_cancelled() {
            return Err(FeedError::Cancelled);
        }

        let auth = self.subscription.auth_frame()?;
        {
            let mut state = self.state.write();
            if !matches!(*state, FeedState::Reconnecting { .. }) {
                *state = FeedState::Connecting;
            }
        }

        let url = self.endpoint.url();
        info!(url, "Connecting to feed");
        let (sink, stream) = match self.connector.connect(url).await {
            Ok(halves) => halves,
            Err(e) => {
                warn!(url, error = %e, "Feed connection failed");
                let mut state = self.state.write();
                if *state == FeedState::Connecting {
                    *state = FeedState::Disconnected;
                }
                return Err(e.into());
            }
        };

        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed) + 1;
        let closed = CancellationToken::new();
        let session = slot.insert(Session {
            id,
            sink,
            closed: closed.clone(),
        });
        spawn_receive_loop(Arc::clone(self), stream, closed, gate.clone(), id);
        *self.state.write() = FeedState::Connected;
        info!(session = id, symbols = self.subscription.symbols(), "Connected to feed");

        session.sink.send(&auth).await.map_err(|e| {
            warn!(session = id, error = %e, "Failed to send credentials");
            FeedError::Auth(e)
        })?;
        debug!(session = id, "Sent auth frame");
        Ok(())
    }

    /// Remove session `id` if it is still the live one
    ///
    /// Returns false when `disconnect` or a newer session got there first.
    async fn teardown(&self, id: u64) -> bool {
        let mut slot = self.session.lock().await;
        if !slot.as_ref().is_some_and(|s| s.id == id) {
            return false;
        }
        let Some(session) = slot.take() else {
            return false;
        };
        *self.state.write() = FeedState::Disconnected;

        if let Err(e) = session.close().await {
            debug!(session = id, error = %e, "Close after read failure");
        }
        true
    }

    /// Retry `establish` with a fixed delay until it succeeds, the policy is
    /// exhausted, or `gate` fires
    async fn reconnect(self: &Arc<Self>, gate: CancellationToken) {
        let policy = self.retry.read().clone();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let next = if policy.allows(attempt) {
                FeedState::Reconnecting { attempt }
            } else {
                FeedState::Stopped
            };
            if !self.claim_state(&gate, next) {
                self.stop_reconnecting().await;
                return;
            }
            if !policy.allows(attempt) {
                error!(
                    max_attempts = policy.max_attempts,
                    "Max retries reached, stopping reconnection attempts"
                );
                self.handlers().invoke_fault(&FeedFault::RetriesExhausted {
                    attempts: policy.max_attempts,
                });
                return;
            }

            self.handlers().invoke_reconnect_attempt(attempt);
            info!(attempt, max_attempts = policy.max_attempts, "Attempting to reconnect");

            match self.establish(&gate).await {
                Ok(()) => {
                    info!(attempt, "Reconnected to feed");
                    return;
                }
                Err(FeedError::Cancelled) => {
                    self.stop_reconnecting().await;
                    return;
                }
                Err(e) => warn!(attempt, error = %e, "Reconnect attempt failed"),
            }

            tokio::select! {
                _ = gate.cancelled() => {
                    self.stop_reconnecting().await;
                    return;
                }
                _ = tokio::time::sleep(policy.delay) => {}
            }
        }
    }

    /// Write the reconnect loop's next state unless `gate` has fired
    ///
    /// `disconnect` cancels the gate under the same lock, so a loop that lost
    /// the race never overwrites the state of whoever replaced it.
    fn claim_state(&self, gate: &CancellationToken, next: FeedState) -> bool {
        let _stop = self.stop.lock();
        if gate.is_cancelled() {
            return false;
        }
        *self.state.write() = next;
        true
    }

    /// Settle the state after the gate fired mid-reconnect
    ///
    /// Leaves the state alone once `connect` has issued a newer gate or
    /// installed a session.
    async fn stop_reconnecting(&self) {
        let slot = self.session.lock().await;
        let rearmed = !self.stop.lock().is_cancelled();
        if slot.is_some() || rearmed {
            debug!("Feed restarted by connect, old reconnect loop exits quietly");
            return;
        }
        info!("Reconnect stopped by disconnect");
        *self.state.write() = FeedState::Disconnected;
    }

    /// Route one inbound frame to its handler
    fn dispatch(&self, text: &str) {
        match Frame::classify(text) {
            Frame::StatusLine(line) => {
                debug!(status = %line, "Feed status line");
            }
            Frame::Connected(notice) => {
                info!(message = %notice.message, "Feed confirmed connection");
                self.handlers().invoke_connected(&notice);
            }
            Frame::Notice(notice) => {
                info!(status = %notice.status, message = %notice.message, "Feed status notice");
            }
            Frame::Quote(quote) => match quote.human_timestamp(self.timestamp_zone) {
                Ok(timestamp) => self.handlers().invoke_quote(&quote, &timestamp),
                Err(e) => {
                    warn!(symbol = %quote.symbol, ts = %quote.ts, error = %e, "Dropping quote");
                    self.handlers().invoke_fault(&FeedFault::InvalidTimestamp {
                        symbol: quote.symbol,
                        ts: quote.ts,
                    });
                }
            },
            Frame::Malformed { reason } => {
                warn!(%reason, "Dropping unrecognised frame");
                self.handlers().invoke_fault(&FeedFault::Malformed {
                    raw: text.to_string(),
                    reason,
                });
            }
        }
    }
}

fn spawn_receive_loop(
    inner: Arc<Inner>,
    stream: BoxFrameStream,
    closed: CancellationToken,
    gate: CancellationToken,
    id: u64,
) {
    let task: BoxFuture<'static, ()> = Box::pin(receive_loop(inner, stream, closed, gate, id));
    tokio::spawn(task);
}

async fn receive_loop(
    inner: Arc<Inner>,
    mut stream: BoxFrameStream,
    closed: CancellationToken,
    gate: CancellationToken,
    id: u64,
) {
    debug!(session = id, "Receive loop started");

    let error = loop {
        let next = tokio::select! {
            biased;
            _ = closed.cancelled() => None,
            frame = stream.recv() => Some(frame),
        };

        match next {
            None => {
                debug!(session = id, "Receive loop stopped by disconnect");
                return;
            }
            Some(Ok(Some(text))) => inner.dispatch(&text),
            Some(Ok(None)) => break TransportError::ConnectionClosed,
            Some(Err(e)) => break e,
        }
    };

    warn!(session = id, error = %error, "Feed read failed");
    if !inner.teardown(id).await {
        debug!(session = id, "Session already replaced, not reconnecting");
        return;
    }
    inner.handlers().invoke_fault(&FeedFault::Transport(error.to_string()));

    if inner.auto_reconnect.load(Ordering::Relaxed) {
        inner.reconnect(gate).await;
    } else {
        info!(session = id, "Auto-reconnect disabled, feed stays disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockConnector;
    use rust_decimal_macros::dec;

    const QUOTE: &str =
        r#"{"symbol":"EURUSD","bid":1.1,"ask":1.2,"mid":1.15,"ts":"1700000000123"}"#;

    fn test_config(retry: RetryPolicy) -> FeedConfig {
        FeedConfig::new(Subscription::new("k1", "EURUSD,GBPUSD"))
            .with_endpoint(Endpoint::Custom("wss://mock.test".into()))
            .with_retry(retry)
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_attempts(max_attempts)
            .with_delay(Duration::from_millis(10))
    }

    fn mock_client(config: FeedConfig) -> (FeedClient, MockConnector) {
        let connector = MockConnector::new();
        let client = FeedClient::with_connector(config, Arc::new(connector.clone()));
        (client, connector)
    }

    async fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        for _ in 0..400 {
            if cond() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        cond()
    }

    fn record_attempts(client: &FeedClient) -> Arc<parking_lot::Mutex<Vec<u32>>> {
        let attempts = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = attempts.clone();
        client.set_reconnect_handler(move |attempt| sink.lock().push(attempt));
        attempts
    }

    fn record_quotes(client: &FeedClient) -> Arc<parking_lot::Mutex<Vec<(QuoteMessage, String)>>> {
        let quotes = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = quotes.clone();
        client.set_quote_handler(move |quote, ts| sink.lock().push((quote.clone(), ts.to_string())));
        quotes
    }

    #[test]
    fn test_feed_config() {
        let config = FeedConfig::new(Subscription::new("k", "EURUSD"))
            .with_timeout(Duration::from_secs(3))
            .with_timestamp_zone(TimestampZone::Local)
            .without_reconnect();

        assert_eq!(config.endpoint, Endpoint::Production);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.timestamp_zone, TimestampZone::Local);
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(!config.auto_reconnect);
    }

    #[test]
    fn test_initial_state() {
        let (client, _) = mock_client(test_config(RetryPolicy::default()));
        assert_eq!(client.state(), FeedState::Disconnected);
        assert!(!client.is_connected());
        assert_eq!(client.subscription().symbols(), "EURUSD,GBPUSD");

        client.set_retry_policy(fast_retry(9));
        assert_eq!(client.retry_policy().max_attempts, 9);
    }

    #[tokio::test]
    async fn test_auth_frame_sent_after_connect() {
        let (client, connector) = mock_client(test_config(RetryPolicy::default()));

        client.connect().await.unwrap();

        assert!(client.is_connected());
        assert_eq!(connector.connect_count(), 1);
        assert_eq!(
            connector.sent_frames(),
            vec![r#"{"userKey":"k1","symbol":"EURUSD,GBPUSD"}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn test_second_connect_is_noop() {
        let (client, connector) = mock_client(test_config(RetryPolicy::default()));

        client.connect().await.unwrap();
        client.connect().await.unwrap();

        assert_eq!(connector.connect_count(), 1);
        assert_eq!(connector.sent_frames().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_installs_nothing() {
        let (client, connector) = mock_client(test_config(RetryPolicy::default()));
        connector.set_fail_connect(true);

        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, FeedError::Transport(TransportError::ConnectionFailed(_))));
        assert_eq!(client.state(), FeedState::Disconnected);

        connector.set_fail_connect(false);
        client.connect().await.unwrap();
        assert_eq!(connector.connect_count(), 2);
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn test_auth_failure_keeps_connection() {
        let (client, connector) = mock_client(test_config(RetryPolicy::default()));
        connector.set_fail_send(true);

        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, FeedError::Auth(_)));
        assert!(client.is_connected());

        // handle still installed, so this is a no-op
        client.connect().await.unwrap();
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_quote_dispatch() {
        let (client, connector) = mock_client(test_config(RetryPolicy::default()));
        let quotes = record_quotes(&client);
        client.connect().await.unwrap();

        assert!(connector.push_frame(QUOTE));
        assert!(wait_for(|| quotes.lock().len() == 1).await);

        let (quote, timestamp) = quotes.lock()[0].clone();
        assert_eq!(quote.symbol, "EURUSD");
        assert_eq!(quote.bid, dec!(1.1));
        assert_eq!(quote.ask, dec!(1.2));
        assert_eq!(quote.mid, dec!(1.15));
        assert_eq!(timestamp, "2023-11-14 22:13:20.123");
    }

    #[tokio::test]
    async fn test_connected_notice_dispatch() {
        let (client, connector) = mock_client(test_config(RetryPolicy::default()));
        let notices = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = notices.clone();
        client.set_connected_handler(move |notice| sink.lock().push(notice.message.clone()));
        let quotes = record_quotes(&client);
        client.connect().await.unwrap();

        connector.push_frame(r#"{"status":"connected","message":"ok"}"#);
        assert!(wait_for(|| notices.lock().len() == 1).await);

        assert_eq!(notices.lock()[0], "ok");
        assert!(quotes.lock().is_empty());
    }

    #[tokio::test]
    async fn test_other_status_and_status_lines_invoke_nothing() {
        let (client, connector) = mock_client(test_config(RetryPolicy::default()));
        let connected = Arc::new(AtomicU64::new(0));
        let counter = connected.clone();
        client.set_connected_handler(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let quotes = record_quotes(&client);
        client.connect().await.unwrap();

        connector.push_frame(r#"{"status":"error","message":"invalid key"}"#);
        connector.push_frame("PONG");
        // frames are handled in order, so this quote marks the end
        connector.push_frame(QUOTE);
        assert!(wait_for(|| quotes.lock().len() == 1).await);

        assert_eq!(connected.load(Ordering::SeqCst), 0);
        assert_eq!(quotes.lock().len(), 1);
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn test_bad_frames_are_reported_not_fatal() {
        let (client, connector) = mock_client(test_config(RetryPolicy::default()));
        let faults = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = faults.clone();
        client.set_fault_handler(move |fault| sink.lock().push(fault.clone()));
        let quotes = record_quotes(&client);
        client.connect().await.unwrap();

        connector.push_frame("{broken");
        connector.push_frame(r#"{"symbol":"GBPUSD","bid":1.2,"ask":1.3,"mid":1.25,"ts":"later"}"#);
        connector.push_frame(QUOTE);
        assert!(wait_for(|| quotes.lock().len() == 1).await);

        let faults = faults.lock();
        assert_eq!(faults.len(), 2);
        assert!(matches!(&faults[0], FeedFault::Malformed { raw, .. } if raw == "{broken"));
        assert_eq!(
            faults[1],
            FeedFault::InvalidTimestamp {
                symbol: "GBPUSD".to_string(),
                ts: "later".to_string(),
            }
        );
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn test_reconnect_resends_auth() {
        let (client, connector) = mock_client(test_config(fast_retry(5)));
        let attempts = record_attempts(&client);
        client.connect().await.unwrap();

        connector.push_error(TransportError::ReceiveFailed("reset by peer".into()));
        assert!(wait_for(|| connector.sent_frames().len() == 2).await);

        assert_eq!(*attempts.lock(), vec![1]);
        assert_eq!(connector.connect_count(), 2);
        let frames = connector.sent_frames();
        assert_eq!(frames[0], frames[1]);
        assert!(wait_for(|| client.is_connected()).await);
    }

    #[tokio::test]
    async fn test_server_close_triggers_reconnect() {
        let (client, connector) = mock_client(test_config(fast_retry(5)));
        let attempts = record_attempts(&client);
        client.connect().await.unwrap();

        connector.push_close();
        assert!(wait_for(|| connector.connect_count() == 2).await);
        assert_eq!(*attempts.lock(), vec![1]);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let (client, connector) = mock_client(test_config(fast_retry(3)));
        let attempts = record_attempts(&client);
        let faults = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = faults.clone();
        client.set_fault_handler(move |fault| sink.lock().push(fault.clone()));
        client.connect().await.unwrap();

        connector.set_fail_connect(true);
        connector.push_error(TransportError::ConnectionClosed);
        assert!(wait_for(|| client.state() == FeedState::Stopped).await);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*attempts.lock(), vec![1, 2, 3]);
        assert_eq!(connector.connect_count(), 4);
        assert_eq!(client.state(), FeedState::Stopped);
        assert_eq!(
            faults.lock().last(),
            Some(&FeedFault::RetriesExhausted { attempts: 3 })
        );
    }

    #[tokio::test]
    async fn test_disconnect_stops_pending_retry() {
        let retry = RetryPolicy::new()
            .with_max_attempts(10)
            .with_delay(Duration::from_millis(200));
        let (client, connector) = mock_client(test_config(retry));
        let attempts = record_attempts(&client);
        client.connect().await.unwrap();

        connector.set_fail_connect(true);
        connector.push_error(TransportError::ConnectionClosed);
        assert!(wait_for(|| connector.connect_count() == 2).await);

        client.disconnect().await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(*attempts.lock(), vec![1]);
        assert_eq!(connector.connect_count(), 2);
        assert_eq!(client.state(), FeedState::Disconnected);
    }

    #[tokio::test]
    async fn test_stopped_reconnect_leaves_new_session_state() {
        let retry = RetryPolicy::new()
            .with_max_attempts(10)
            .with_delay(Duration::from_millis(200));
        let (client, connector) = mock_client(test_config(retry));
        let attempts = record_attempts(&client);
        client.connect().await.unwrap();

        connector.set_fail_connect(true);
        connector.push_error(TransportError::ReceiveFailed("reset".into()));
        assert!(wait_for(|| connector.connect_count() == 2).await);

        client.disconnect().await.unwrap();
        connector.set_fail_connect(false);
        client.connect().await.unwrap();
        assert_eq!(client.state(), FeedState::Connected);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(client.state(), FeedState::Connected);
        assert!(client.is_connected());
        assert_eq!(*attempts.lock(), vec![1]);
        assert_eq!(connector.connect_count(), 3);

        let quotes = record_quotes(&client);
        assert!(connector.push_frame(QUOTE));
        assert!(wait_for(|| quotes.lock().len() == 1).await);
    }

    #[tokio::test]
    async fn test_no_reconnect_when_disabled() {
        let (client, connector) = mock_client(test_config(fast_retry(5)).without_reconnect());
        let attempts = record_attempts(&client);
        client.connect().await.unwrap();

        connector.push_error(TransportError::ConnectionClosed);
        assert!(wait_for(|| client.state() == FeedState::Disconnected).await);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(attempts.lock().is_empty());
        assert_eq!(connector.connect_count(), 1);
        assert_eq!(connector.close_count(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_closes_without_reconnect() {
        let (client, connector) = mock_client(test_config(fast_retry(5)));
        let attempts = record_attempts(&client);
        client.connect().await.unwrap();

        client.disconnect().await.unwrap();
        assert_eq!(client.state(), FeedState::Disconnected);
        assert_eq!(connector.close_count(), 1);
        assert!(!connector.push_frame(QUOTE));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(attempts.lock().is_empty());
        assert_eq!(connector.connect_count(), 1);

        // repeated disconnect is harmless
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_after_disconnect() {
        let (client, connector) = mock_client(test_config(fast_retry(5)));
        let quotes = record_quotes(&client);

        client.connect().await.unwrap();
        client.disconnect().await.unwrap();
        client.connect().await.unwrap();

        assert!(client.is_connected());
        assert_eq!(connector.connect_count(), 2);
        assert_eq!(connector.sent_frames().len(), 2);

        connector.push_frame(QUOTE);
        assert!(wait_for(|| quotes.lock().len() == 1).await);

        // the fresh gate still drives reconnection
        let attempts = record_attempts(&client);
        connector.push_error(TransportError::ConnectionClosed);
        assert!(wait_for(|| connector.connect_count() == 3).await);
        assert_eq!(*attempts.lock(), vec![1]);
    }

    #[tokio::test]
    async fn test_handlers_can_be_replaced_while_connected() {
        let (client, connector) = mock_client(test_config(RetryPolicy::default()));
        client.connect().await.unwrap();

        connector.push_frame(QUOTE);
        tokio::time::sleep(Duration::from_millis(20)).await;

        let quotes = record_quotes(&client);
        connector.push_frame(QUOTE);
        assert!(wait_for(|| quotes.lock().len() == 1).await);
    }
}
