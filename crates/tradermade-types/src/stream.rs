//! Streaming feed messages
//!
//! The feed speaks plain JSON objects without an envelope, so frames are
//! told apart by shape. Status notices are tried before quotes: a notice
//! parsed as a quote would fail field validation or half-populate a record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};
use crate::time::{format_timestamp_millis, parse_timestamp_millis, TimestampZone};

/// Status value the server sends once the session is live
pub const CONNECTED_STATUS: &str = "connected";

// ============================================================================
// Outbound
// ============================================================================

/// Authentication frame sent right after the socket opens
///
/// Serializes to `{"userKey":"...","symbol":"..."}` with no extra whitespace.
#[derive(Serialize)]
pub struct AuthRequest<'a> {
    /// Streaming API key
    #[serde(rename = "userKey")]
    pub user_key: &'a str,
    /// Comma-separated instrument list
    pub symbol: &'a str,
}

impl<'a> AuthRequest<'a> {
    /// Create an auth request
    pub fn new(user_key: &'a str, symbol: &'a str) -> Self {
        Self { user_key, symbol }
    }

    /// Encode as compact JSON
    pub fn to_json(&self) -> ParseResult<String> {
        serde_json::to_string(self).map_err(|e| ParseError::InvalidJson {
            message: e.to_string(),
            raw: None,
        })
    }
}

// ============================================================================
// Inbound
// ============================================================================

/// Connection status notice, e.g. `{"status":"connected","message":"..."}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusNotice {
    /// Status keyword
    pub status: String,
    /// Free-form server message
    #[serde(default)]
    pub message: String,
}

impl StatusNotice {
    /// Whether this notice confirms the session is live
    pub fn is_connected(&self) -> bool {
        self.status == CONNECTED_STATUS
    }
}

/// Real-time quote update
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuoteMessage {
    /// Instrument symbol (e.g. "EURUSD")
    pub symbol: String,
    /// Bid price
    pub bid: Decimal,
    /// Ask price
    pub ask: Decimal,
    /// Mid price
    pub mid: Decimal,
    /// Milliseconds since epoch, sent as a string
    pub ts: String,
}

impl QuoteMessage {
    /// Parse the timestamp into milliseconds since epoch
    pub fn timestamp_millis(&self) -> ParseResult<i64> {
        parse_timestamp_millis(&self.ts)
    }

    /// Render the timestamp as `YYYY-MM-DD HH:MM:SS.mmm`
    pub fn human_timestamp(&self, zone: TimestampZone) -> ParseResult<String> {
        format_timestamp_millis(self.timestamp_millis()?, zone)
    }

    /// Ask minus bid
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}

/// A classified inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Status notice carrying the connected sentinel
    Connected(StatusNotice),
    /// Any other status notice
    Notice(StatusNotice),
    /// Quote update
    Quote(QuoteMessage),
    /// Plain text line that is not JSON (e.g. "PONG")
    StatusLine(String),
    /// Looked like JSON but matched no known shape
    Malformed {
        /// Decoder error
        reason: String,
    },
}

impl Frame {
    /// Classify a raw text frame
    pub fn classify(text: &str) -> Self {
        let body = text.trim_start();
        if !(body.starts_with('{') || body.starts_with('[')) {
            return Self::StatusLine(text.trim().to_string());
        }

        // notices and quotes are objects; serde would also fill them from an array
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(serde_json::Value::Object(_)) => {}
            Ok(_) => {
                return Self::Malformed {
                    reason: "expected a JSON object".to_string(),
                }
            }
            Err(e) => {
                return Self::Malformed {
                    reason: e.to_string(),
                }
            }
        }

        if let Ok(notice) = serde_json::from_str::<StatusNotice>(body) {
            return if notice.is_connected() {
                Self::Connected(notice)
            } else {
                Self::Notice(notice)
            };
        }

        match serde_json::from_str::<QuoteMessage>(body) {
            Ok(quote) => Self::Quote(quote),
            Err(e) => Self::Malformed {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_auth_request_is_compact() {
        let json = AuthRequest::new("k1", "EURUSD,GBPUSD").to_json().unwrap();
        assert_eq!(json, r#"{"userKey":"k1","symbol":"EURUSD,GBPUSD"}"#);
    }

    #[test]
    fn test_auth_request_escapes() {
        let json = AuthRequest::new("a\"b", "EURUSD").to_json().unwrap();
        assert_eq!(json, r#"{"userKey":"a\"b","symbol":"EURUSD"}"#);
    }

    #[test]
    fn test_classify_connected() {
        let frame = Frame::classify(r#"{"status":"connected","message":"ok"}"#);
        match frame {
            Frame::Connected(notice) => assert_eq!(notice.message, "ok"),
            other => panic!("expected Connected, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_other_status_is_not_quote() {
        let frame = Frame::classify(r#"{"status":"error","message":"bad key"}"#);
        match frame {
            Frame::Notice(notice) => {
                assert_eq!(notice.status, "error");
                assert!(!notice.is_connected());
            }
            other => panic!("expected Notice, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_quote() {
        let frame = Frame::classify(
            r#"{"symbol":"EURUSD","bid":1.1,"ask":1.2,"mid":1.15,"ts":"1700000000123"}"#,
        );
        let Frame::Quote(quote) = frame else {
            panic!("expected Quote");
        };
        assert_eq!(quote.symbol, "EURUSD");
        assert_eq!(quote.bid, dec!(1.1));
        assert_eq!(quote.ask, dec!(1.2));
        assert_eq!(quote.mid, dec!(1.15));
        assert_eq!(quote.spread(), dec!(0.1));
        assert_eq!(quote.timestamp_millis().unwrap(), 1_700_000_000_123);
        assert!(quote
            .human_timestamp(TimestampZone::Utc)
            .unwrap()
            .ends_with(".123"));
    }

    #[test]
    fn test_classify_status_line() {
        assert_eq!(Frame::classify("PONG"), Frame::StatusLine("PONG".to_string()));
        assert_eq!(
            Frame::classify("  Connected\n"),
            Frame::StatusLine("Connected".to_string())
        );
    }

    #[test]
    fn test_classify_leading_whitespace_json() {
        let frame = Frame::classify("  \n{\"status\":\"connected\",\"message\":\"hi\"}");
        assert!(matches!(frame, Frame::Connected(_)));
    }

    #[test]
    fn test_classify_malformed() {
        assert!(matches!(Frame::classify("{not json"), Frame::Malformed { .. }));
        assert!(matches!(
            Frame::classify(r#"{"symbol":"EURUSD","bid":"abc"}"#),
            Frame::Malformed { .. }
        ));
    }

    #[test]
    fn test_classify_arrays_are_malformed() {
        let notice = Frame::classify(r#"["connected","ok"]"#);
        match notice {
            Frame::Malformed { reason } => assert!(reason.contains("object")),
            other => panic!("expected Malformed, got {other:?}"),
        }
        assert!(matches!(
            Frame::classify(r#"["EURUSD",1.1,1.2,1.15,"1700000000123"]"#),
            Frame::Malformed { .. }
        ));
        assert!(matches!(Frame::classify("  [ ]"), Frame::Malformed { .. }));
    }

    #[test]
    fn test_bad_timestamp_text() {
        let Frame::Quote(quote) =
            Frame::classify(r#"{"symbol":"GBPUSD","bid":1,"ask":2,"mid":1.5,"ts":"soon"}"#)
        else {
            panic!("expected Quote");
        };
        assert!(matches!(
            quote.timestamp_millis(),
            Err(ParseError::InvalidTimestamp { .. })
        ));
    }
}
