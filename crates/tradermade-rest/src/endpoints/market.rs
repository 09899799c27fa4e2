//! Live rate and currency conversion endpoints

use super::execute;
use crate::error::{RestError, RestResult};
use crate::types::{ConvertResponse, LiveRate};
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use tracing::{debug, instrument};
use tradermade_types::ApiKey;

/// Live rate and conversion endpoints
pub struct MarketEndpoints<'a> {
    client: &'a Client,
    base_url: &'a str,
    api_key: &'a ApiKey,
}

impl<'a> MarketEndpoints<'a> {
    pub fn new(client: &'a Client, base_url: &'a str, api_key: &'a ApiKey) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Get live quotes
    ///
    /// # Arguments
    /// * `currencies` - Currency pairs or instrument codes (e.g., ["EURUSD", "UK100"])
    #[instrument(skip(self))]
    pub async fn live_rates(&self, currencies: &[&str]) -> RestResult<LiveRate> {
        if currencies.is_empty() {
            return Err(RestError::InvalidParameter(
                "at least one currency is required".to_string(),
            ));
        }
        debug!("Fetching live rates for {} instruments", currencies.len());

        execute(self.live_request(currencies)).await
    }

    /// Convert an amount between two currencies
    ///
    /// Whitespace in the currency codes is removed before sending.
    #[instrument(skip(self))]
    pub async fn convert(&self, from: &str, to: &str, amount: Decimal) -> RestResult<ConvertResponse> {
        debug!("Converting {} {} to {}", amount, from, to);

        execute(self.convert_request(from, to, amount)).await
    }

    pub(crate) fn live_request(&self, currencies: &[&str]) -> RequestBuilder {
        let url = format!("{}/live", self.base_url);
        self.client.get(url).query(&[
            ("currency", currencies.join(",").as_str()),
            ("api_key", self.api_key.expose()),
        ])
    }

    pub(crate) fn convert_request(&self, from: &str, to: &str, amount: Decimal) -> RequestBuilder {
        let url = format!("{}/convert", self.base_url);
        self.client.get(url).query(&[
            ("from", strip_whitespace(from).as_str()),
            ("to", strip_whitespace(to).as_str()),
            ("amount", amount.to_string().as_str()),
            ("api_key", self.api_key.expose()),
        ])
    }
}

fn strip_whitespace(code: &str) -> String {
    code.chars().filter(|c| !c.is_whitespace()).collect()
}
