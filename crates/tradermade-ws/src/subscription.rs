//! Feed subscription
//!
//! A feed client carries one subscription for its whole life. The same auth
//! frame is resent on every reconnection.

use tradermade_types::{ApiKey, AuthRequest, ParseResult};

/// Instrument list plus the credential that unlocks it
#[derive(Debug, Clone)]
pub struct Subscription {
    api_key: ApiKey,
    symbols: String,
}

impl Subscription {
    /// Create a subscription from an already comma-joined list
    ///
    /// The list is sent verbatim.
    pub fn new(api_key: impl Into<ApiKey>, symbols: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            symbols: symbols.into(),
        }
    }

    /// Create a subscription from individual symbols
    ///
    /// Symbols are trimmed and empty entries dropped before joining with `,`.
    pub fn from_symbols(
        api_key: impl Into<ApiKey>,
        symbols: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        let joined = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(api_key, joined)
    }

    /// Comma-joined symbol list
    pub fn symbols(&self) -> &str {
        &self.symbols
    }

    /// Number of instruments in the list
    pub fn len(&self) -> usize {
        self.symbols.split(',').filter(|s| !s.is_empty()).count()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the auth frame sent after every successful connect
    pub fn auth_frame(&self) -> ParseResult<String> {
        AuthRequest::new(self.api_key.expose(), &self.symbols).to_json()
    }
}
