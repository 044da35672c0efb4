//! Financial Modeling Prep: index and forex quotes.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use mwlite_core::{Category, Period, PricePoint};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::http::HttpClient;
use crate::source::{BoxFuture, PriceSource};

/// API root; `/v3` and `/v4` are appended per endpoint.
pub const FMP_BASE_URL: &str = "https://financialmodelingprep.com/api";

/// Placeholder key shipped in sample configs.
pub const PLACEHOLDER_KEY: &str = "YOUR_FMP_API_KEY_HERE";

/// True when `key` can authenticate against FMP.
pub fn is_usable_key(key: Option<&str>) -> bool {
    match key.map(str::trim) {
        None | Some("") | Some("demo") | Some(PLACEHOLDER_KEY) => false,
        Some(_) => true,
    }
}

/// Start and end (inclusive) of the start-of-year lookup window.
pub fn year_start_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
    let end = NaiveDate::from_ymd_opt(today.year(), 1, 6).unwrap_or(today);
    (start, end)
}

/// Ticker used in URL paths; `^` is percent-encoded.
fn path_symbol(ticker: &str) -> String {
    ticker.replace('^', "%5E")
}

/// One entry of `/v3/quote/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpQuote {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HistoricalResponse {
    #[serde(default)]
    historical: Vec<HistoricalBar>,
}

#[derive(Debug, Deserialize)]
struct HistoricalBar {
    close: Option<f64>,
}

/// Authenticated FMP client shared by every FMP-backed source.
pub struct FmpClient {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl FmpClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        is_usable_key(self.api_key.as_deref())
    }

    fn key(&self) -> FetchResult<String> {
        match &self.api_key {
            Some(key) if self.is_configured() => Ok(key.clone()),
            _ => Err(FetchError::Unconfigured("FMP API key".to_string())),
        }
    }

    pub(crate) async fn get_v4<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        mut query: Vec<(&str, String)>,
    ) -> FetchResult<T> {
        query.push(("apikey", self.key()?));
        let url = format!("{}/v4/{}", self.base_url, path);
        self.http.get_json(&url, &query, &[]).await
    }

    /// Latest quote for `ticker`.
    pub async fn quote(&self, ticker: &str) -> FetchResult<FmpQuote> {
        let url = format!("{}/v3/quote/{}", self.base_url, path_symbol(ticker));
        let quotes: Vec<FmpQuote> = self
            .http
            .get_json(&url, &[("apikey", self.key()?)], &[])
            .await?;

        quotes
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Malformed(format!("empty quote for {ticker}")))
    }

    /// Close of the earliest daily bar in `[from, to]`, if any.
    pub async fn earliest_close(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> FetchResult<Option<f64>> {
        let url = format!(
            "{}/v3/historical-price-full/{}",
            self.base_url,
            path_symbol(ticker)
        );
        let response: HistoricalResponse = self
            .http
            .get_json(
                &url,
                &[
                    ("from", from.to_string()),
                    ("to", to.to_string()),
                    ("apikey", self.key()?),
                ],
                &[],
            )
            .await?;

        // Bars arrive newest first.
        Ok(response.historical.last().and_then(|bar| bar.close))
    }
}

/// Quote source for equity indices or forex pairs.
pub struct FmpQuoteSource {
    client: Arc<FmpClient>,
    category: Category,
}

impl FmpQuoteSource {
    pub fn new(client: Arc<FmpClient>, category: Category) -> Self {
        Self { client, category }
    }

    pub fn indices(client: Arc<FmpClient>) -> Self {
        Self::new(client, Category::EquityIndex)
    }

    pub fn forex(client: Arc<FmpClient>) -> Self {
        Self::new(client, Category::Forex)
    }

    /// Map a display name or alias to the FMP ticker.
    pub fn ticker_for(&self, symbol: &str) -> String {
        if let Some(profile) = mwlite_mock::lookup(symbol, self.category) {
            return profile.symbol.to_string();
        }
        let ticker = symbol.trim().to_ascii_uppercase();
        match self.category {
            Category::Forex => ticker.replace('/', ""),
            _ => ticker,
        }
    }

    async fn fetch_point(&self, symbol: &str, period: Period) -> FetchResult<PricePoint> {
        let ticker = self.ticker_for(symbol);

        let (quote, start_close) = match period {
            Period::Recent => (self.client.quote(&ticker).await?, None),
            Period::YearToDate => {
                let (from, to) = year_start_window(Utc::now().date_naive());
                let (quote, history) = tokio::join!(
                    self.client.quote(&ticker),
                    self.client.earliest_close(&ticker, from, to)
                );
                let start_close = match history {
                    Ok(close) => close,
                    Err(e) => {
                        warn!(symbol = %ticker, error = %e, "Start-of-year history unavailable");
                        None
                    }
                };
                (quote?, start_close)
            }
        };

        let current = quote
            .price
            .ok_or_else(|| FetchError::Malformed(format!("quote for {ticker} has no price")))?;
        let previous = match period {
            Period::Recent => quote.previous_close,
            // Without a start-of-year close the quote's daily change stands in.
            Period::YearToDate => start_close
                .filter(|close| *close != 0.0)
                .or(quote.previous_close),
        }
        .unwrap_or(current);

        let label = quote
            .name
            .filter(|name| !name.trim().is_empty())
            .or(quote.symbol)
            .unwrap_or(ticker);

        debug!(symbol = %label, current, previous, "FMP quote point");
        Ok(PricePoint::new(label, current, previous))
    }
}

impl PriceSource for FmpQuoteSource {
    fn name(&self) -> &str {
        match self.category {
            Category::Forex => "fmp-forex",
            _ => "fmp-index",
        }
    }

    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    fn fetch<'a>(&'a self, symbol: &'a str, period: Period) -> BoxFuture<'a, FetchResult<PricePoint>> {
        Box::pin(self.fetch_point(symbol, period))
    }
}
