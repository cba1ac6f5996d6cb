//! Live exchange rate sources
//!
//! A source answers with a map of USD-pivot quotes. The HTTP source expects
//! the common `{"base": "...", "rates": {"EUR": 0.92, ...}}` shape. Quote
//! numbers are decoded straight into `Decimal`, keeping every digit sent.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::models::Currency;

/// Failure to obtain live quotes
#[derive(Error, Debug)]
pub enum RateFetchError {
    #[error("rate request failed: {0}")]
    Http(String),
    #[error("rate response could not be decoded: {0}")]
    Decode(String),
    #[error("rate response contained no usable quotes")]
    Empty,
}

/// A provider of live USD-pivot quotes
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch units-per-USD quotes for as many supported currencies as possible
    async fn fetch_quotes(&self) -> Result<HashMap<Currency, Decimal>, RateFetchError>;
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    base: String,
    rates: HashMap<String, Decimal>,
}

/// Fetches quotes from a JSON HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: Client,
    url: String,
}

impl HttpRateSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_quotes(&self) -> Result<HashMap<Currency, Decimal>, RateFetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RateFetchError::Http(e.to_string()))?;

        let body: RatesResponse = response
            .json()
            .await
            .map_err(|e| RateFetchError::Decode(e.to_string()))?;

        quotes_per_usd(&body.base, &body.rates)
    }
}

/// Convert a base-relative rate map into USD-pivot quotes
///
/// Unknown codes and non-positive values are skipped. A non-USD base is
/// re-pivoted through the USD entry of the map.
pub(crate) fn quotes_per_usd(
    base: &str,
    rates: &HashMap<String, Decimal>,
) -> Result<HashMap<Currency, Decimal>, RateFetchError> {
    let base: Currency = base
        .parse()
        .map_err(|e: crate::models::UnknownCurrency| RateFetchError::Decode(e.to_string()))?;

    let mut relative: HashMap<Currency, Decimal> = rates
        .iter()
        .filter_map(|(code, value)| {
            let currency = code.parse::<Currency>().ok()?;
            (*value > Decimal::ZERO).then_some((currency, *value))
        })
        .collect();
    relative.insert(base, Decimal::ONE);

    let usd_in_base = relative
        .get(&Currency::Usd)
        .copied()
        .ok_or(RateFetchError::Empty)?;

    let quotes: HashMap<Currency, Decimal> = relative
        .into_iter()
        .filter_map(|(currency, value)| value.checked_div(usd_in_base).map(|q| (currency, q)))
        .collect();

    if quotes.len() < 2 {
        return Err(RateFetchError::Empty);
    }
    Ok(quotes)
}
