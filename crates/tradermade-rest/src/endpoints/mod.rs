//! API endpoint implementations

pub mod history;
pub mod market;

pub use history::{HistoricalInterval, HistoryEndpoints, TimeSeriesInterval};
pub use market::MarketEndpoints;

use crate::error::{RestError, RestResult};
use crate::types::ErrorBody;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Send a prepared GET request and decode the body into `T`
pub(crate) async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> RestResult<T> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    debug!(status = status.as_u16(), len = body.len(), "Received response");

    decode_response(status, &body)
}

/// Map a status and body to a typed record or the matching error
///
/// Non-200 statuses fail with the body's error details when it has any. A 200
/// body carrying a non-zero `error` code is an API error.
pub(crate) fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> RestResult<T> {
    if status != StatusCode::OK {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(detail) if !detail.is_empty() => detail.to_string(),
            _ => body.trim().to_string(),
        };
        return Err(RestError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| RestError::Parse(format!("failed to parse successful response: {}", e)))?;

    if let Some(code) = value.get("error").and_then(serde_json::Value::as_i64) {
        if code != 0 {
            let message = value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(RestError::Api { code, message });
        }
    }

    serde_json::from_value(value)
        .map_err(|e| RestError::Parse(format!("failed to parse successful response: {}", e)))
}
