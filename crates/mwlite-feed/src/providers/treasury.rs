//! US Treasury yields via the FMP v4 `treasury_rates` endpoint.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use mwlite_core::{Category, Period, PricePoint};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::fmp::{year_start_window, FmpClient};
use crate::error::{FetchError, FetchResult};
use crate::source::{BoxFuture, PriceSource};

/// Canonical bond symbol to `treasury_rates` field.
static MATURITY_FIELDS: &[(&str, &str)] = &[
    ("US3M", "month3"),
    ("US2Y", "year2"),
    ("US5Y", "year5"),
    ("US10Y", "year10"),
    ("US30Y", "year30"),
];

type RateRow = Map<String, Value>;

/// Resolve a bond name to `(label, field)`.
pub fn maturity_field(name: &str) -> Option<(&'static str, &'static str)> {
    let profile = mwlite_mock::lookup(name, Category::Bond)?;
    MATURITY_FIELDS
        .iter()
        .find(|(symbol, _)| *symbol == profile.symbol)
        .map(|(_, field)| (profile.label, *field))
}

/// Lookup window for the period's comparison rate.
pub fn comparison_window(period: Period, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match period {
        Period::Recent => (
            today - ChronoDuration::days(3),
            today - ChronoDuration::days(1),
        ),
        Period::YearToDate => year_start_window(today),
    }
}

pub struct TreasurySource {
    client: Arc<FmpClient>,
}

impl TreasurySource {
    pub fn new(client: Arc<FmpClient>) -> Self {
        Self { client }
    }

    async fn rates(&self, query: Vec<(&str, String)>) -> FetchResult<Vec<RateRow>> {
        self.client.get_v4("treasury_rates", query).await
    }

    async fn fetch_point(&self, name: &str, period: Period) -> FetchResult<PricePoint> {
        let (label, field) =
            maturity_field(name).ok_or_else(|| FetchError::UnsupportedSymbol(name.to_string()))?;

        let latest = self.rates(vec![("limit", "1".to_string())]).await?;
        let current = latest
            .first()
            .and_then(|row| row.get(field))
            .and_then(Value::as_f64)
            .ok_or_else(|| FetchError::Malformed(format!("no current {field} rate")))?;

        let (from, to) = comparison_window(period, Utc::now().date_naive());
        let history = self
            .rates(vec![("from", from.to_string()), ("to", to.to_string())])
            .await;

        // Rows arrive newest first.
        let row = match (&history, period) {
            (Ok(rows), Period::Recent) => rows.first(),
            (Ok(rows), Period::YearToDate) => rows.last(),
            (Err(_), _) => None,
        };
        let previous = match row.and_then(|r| r.get(field)).and_then(Value::as_f64) {
            Some(rate) => rate,
            None => {
                let error = history.err().map(|e| e.to_string()).unwrap_or_default();
                warn!(
                    symbol = %label,
                    from = %from,
                    to = %to,
                    error = %error,
                    "No comparison rate, comparing against current"
                );
                current
            }
        };

        debug!(symbol = %label, current, previous, "Treasury point");
        Ok(PricePoint::new(label, current, previous))
    }
}

impl PriceSource for TreasurySource {
    fn name(&self) -> &str {
        "fmp-treasury"
    }

    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    fn fetch<'a>(&'a self, symbol: &'a str, period: Period) -> BoxFuture<'a, FetchResult<PricePoint>> {
        Box::pin(self.fetch_point(symbol, period))
    }
}
