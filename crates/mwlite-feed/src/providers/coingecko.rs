//! CoinGecko crypto prices.

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, Utc};
use mwlite_core::{Period, PricePoint};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::http::HttpClient;
use crate::source::{BoxFuture, PriceSource};

/// Public API root.
pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Header carrying a demo-plan key.
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Ticker to CoinGecko coin id.
static COIN_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("XRP", "ripple"),
    ("ADA", "cardano"),
    ("DOGE", "dogecoin"),
];

/// Resolve a ticker or coin id to `(ticker, coin id)`.
pub fn resolve_coin(symbol: &str) -> Option<(&'static str, &'static str)> {
    let symbol = symbol.trim();
    COIN_IDS
        .iter()
        .find(|(ticker, id)| ticker.eq_ignore_ascii_case(symbol) || id.eq_ignore_ascii_case(symbol))
        .copied()
}

/// History date (`dd-mm-yyyy`) for the period's comparison value.
pub fn history_date(period: Period, today: NaiveDate) -> String {
    match period {
        Period::Recent => (today - ChronoDuration::days(1)).format("%d-%m-%Y").to_string(),
        Period::YearToDate => format!("01-01-{}", today.year()),
    }
}

/// Crypto source backed by CoinGecko.
pub struct CoinGeckoSource {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoSource {
    pub fn new(http: HttpClient, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        self.api_key
            .iter()
            .map(|key| (API_KEY_HEADER, key.clone()))
            .collect()
    }

    async fn fetch_current(&self, coin_id: &str) -> FetchResult<f64> {
        let url = format!("{}/simple/price", self.base_url);
        let body: Value = self
            .http
            .get_json(
                &url,
                &[
                    ("ids", coin_id.to_string()),
                    ("vs_currencies", "usd".to_string()),
                ],
                &self.headers(),
            )
            .await?;

        body.get(coin_id)
            .and_then(|entry| entry.get("usd"))
            .and_then(Value::as_f64)
            .ok_or_else(|| FetchError::Malformed(format!("no usd price for {coin_id}")))
    }

    /// Historical USD price; `None` when the provider has no history for
    /// the date.
    async fn fetch_history(&self, coin_id: &str, date: &str) -> FetchResult<Option<f64>> {
        let url = format!("{}/coins/{}/history", self.base_url, coin_id);
        let result: FetchResult<Value> = self
            .http
            .get_json(
                &url,
                &[
                    ("date", date.to_string()),
                    ("localization", "false".to_string()),
                ],
                &self.headers(),
            )
            .await;

        match result {
            Ok(body) => Ok(body
                .pointer("/market_data/current_price/usd")
                .and_then(Value::as_f64)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_point(&self, symbol: &str, period: Period) -> FetchResult<PricePoint> {
        let (ticker, coin_id) =
            resolve_coin(symbol).ok_or_else(|| FetchError::UnsupportedSymbol(symbol.to_string()))?;

        let current = self.fetch_current(coin_id).await?;
        let date = history_date(period, Utc::now().date_naive());
        let previous = match self.fetch_history(coin_id, &date).await? {
            Some(previous) => previous,
            None => {
                warn!(
                    symbol = %ticker,
                    date = %date,
                    "No historical price, comparing against current"
                );
                current
            }
        };

        debug!(symbol = %ticker, current, previous, "CoinGecko point");
        Ok(PricePoint::new(ticker, current, previous))
    }
}

impl PriceSource for CoinGeckoSource {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn fetch<'a>(&'a self, symbol: &'a str, period: Period) -> BoxFuture<'a, FetchResult<PricePoint>> {
        Box::pin(self.fetch_point(symbol, period))
    }
}
