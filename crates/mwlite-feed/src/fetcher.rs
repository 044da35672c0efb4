//! Per-symbol fetching with mock fallback.
//!
//! Every symbol is fetched independently. A failure is logged, counted and
//! replaced by a mock point for that symbol only; the batch always resolves
//! with one entry per request, in request order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use mwlite_core::{Category, FeedOutcome, FeedResult, Period, PricePoint, SymbolRequest};
use mwlite_mock::MockGenerator;
use mwlite_telemetry::Metrics;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::error::FetchError;
use crate::source::DynPriceSource;

/// What a failed live attempt turns into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Substitute a mock point and flag the entry.
    #[default]
    Mock,
    /// Leave the entry without a point.
    Unavailable,
}

/// Result of trying the live source.
enum LiveAttempt {
    Point(PricePoint),
    /// No configured source for the category.
    Skipped,
    Failed(FetchError),
}

/// Fetches feed symbols from the registered sources.
pub struct FeedFetcher {
    sources: HashMap<Category, DynPriceSource>,
    mock: Arc<MockGenerator>,
    cache: Option<Arc<ResponseCache>>,
    policy: FallbackPolicy,
}

impl FeedFetcher {
    /// Create a fetcher with no sources: everything is simulated until
    /// sources are registered.
    pub fn new(mock: Arc<MockGenerator>) -> Self {
        Self {
            sources: HashMap::new(),
            mock,
            cache: None,
            policy: FallbackPolicy::default(),
        }
    }

    /// Register the source serving `category`, replacing any previous one.
    pub fn with_source(mut self, category: Category, source: DynPriceSource) -> Self {
        self.sources.insert(category, source);
        self
    }

    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.cache.as_ref()
    }

    /// True when `category` has a configured live source.
    pub fn is_live(&self, category: Category) -> bool {
        self.sources
            .get(&category)
            .is_some_and(|source| source.is_configured())
    }

    /// Fetch one symbol's point. Never fails: any live failure yields a
    /// mock point, whatever the fallback policy.
    pub async fn fetch_period_data(&self, request: &SymbolRequest, period: Period) -> PricePoint {
        match self.attempt_live(request, period).await {
            LiveAttempt::Point(point) => point,
            LiveAttempt::Skipped => self.mock.generate(request, period),
            LiveAttempt::Failed(e) => {
                warn!(
                    symbol = %request.identifier(),
                    category = %request.category(),
                    error = %e,
                    "Live fetch failed, using mock data"
                );
                self.mock.generate(request, period)
            }
        }
    }

    /// Fetch one symbol and classify the outcome.
    pub async fn fetch_one(&self, request: &SymbolRequest, period: Period) -> FeedResult {
        let outcome = match self.attempt_live(request, period).await {
            LiveAttempt::Point(point) => FeedOutcome::Live(point),
            LiveAttempt::Skipped => FeedOutcome::Simulated(self.mock.generate(request, period)),
            LiveAttempt::Failed(e) => {
                warn!(
                    symbol = %request.identifier(),
                    category = %request.category(),
                    kind = e.kind(),
                    error = %e,
                    policy = ?self.policy,
                    "Live fetch failed"
                );
                let error = e.to_string();
                match self.policy {
                    FallbackPolicy::Mock => FeedOutcome::Fallback {
                        point: self.mock.generate(request, period),
                        error,
                    },
                    FallbackPolicy::Unavailable => FeedOutcome::Unavailable { error },
                }
            }
        };

        let result = FeedResult::new(request.clone(), outcome);
        Metrics::fetch_outcome(request.category().as_str(), result.outcome_tag());
        result
    }

    /// Fetch every request concurrently. Order is preserved.
    pub async fn fetch_all(&self, requests: &[SymbolRequest], period: Period) -> Vec<FeedResult> {
        join_all(requests.iter().map(|request| self.fetch_one(request, period))).await
    }

    async fn attempt_live(&self, request: &SymbolRequest, period: Period) -> LiveAttempt {
        let category = request.category();
        let Some(source) = self
            .sources
            .get(&category)
            .filter(|source| source.is_configured())
        else {
            return LiveAttempt::Skipped;
        };

        if let Some(point) = self.cache.as_ref().and_then(|c| c.get(request, period)) {
            Metrics::cache_hit(category.as_str());
            debug!(symbol = %request.identifier(), period = %period, "Cache hit");
            return LiveAttempt::Point(point);
        }

        let started = Instant::now();
        let result = source.fetch(request.identifier(), period).await;
        Metrics::fetch_latency(category.as_str(), started.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(point) if point.current_value.is_finite() && point.previous_value.is_finite() => {
                if let Some(cache) = &self.cache {
                    cache.insert(request, period, point.clone());
                }
                LiveAttempt::Point(point)
            }
            Ok(point) => LiveAttempt::Failed(FetchError::Malformed(format!(
                "{} returned non-finite values ({}, {})",
                source.name(),
                point.current_value,
                point.previous_value
            ))),
            Err(e) => LiveAttempt::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedPriceSource;
    use std::time::Duration;

    fn crypto(symbol: &str) -> SymbolRequest {
        SymbolRequest::new(symbol, Category::Crypto)
    }

    fn fetcher_with(source: Arc<ScriptedPriceSource>) -> FeedFetcher {
        FeedFetcher::new(Arc::new(MockGenerator::with_seed(11)))
            .with_source(Category::Crypto, source)
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_others() {
        let source = Arc::new(ScriptedPriceSource::new());
        source.set_values("BTC", 110.0, 100.0);
        source.set_error("ETH", "connection reset");
        source.set_values("SOL", 90.0, 100.0);

        let fetcher = fetcher_with(source.clone());
        let requests = vec![crypto("BTC"), crypto("ETH"), crypto("SOL")];
        let results = fetcher.fetch_all(&requests, Period::Recent).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].request, requests[0]);
        assert_eq!(results[1].request, requests[1]);
        assert_eq!(results[2].request, requests[2]);

        assert!(matches!(results[0].outcome, FeedOutcome::Live(_)));
        assert!(matches!(results[1].outcome, FeedOutcome::Fallback { .. }));
        assert!(matches!(results[2].outcome, FeedOutcome::Live(_)));

        assert!(results[1].had_error());
        assert!(results[1].is_mock());
        assert!(!results[1].failed());
        assert_eq!(results[1].point().map(|p| p.label.as_str()), Some("Ethereum"));
        assert!(results[1].error().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_unconfigured_source_is_never_called() {
        let source = Arc::new(ScriptedPriceSource::new());
        source.set_values("BTC", 110.0, 100.0);
        source.set_configured(false);

        let fetcher = fetcher_with(source.clone());
        let result = fetcher.fetch_one(&crypto("BTC"), Period::Recent).await;

        assert!(matches!(result.outcome, FeedOutcome::Simulated(_)));
        assert!(!result.had_error());
        assert_eq!(source.call_count(), 0);
        assert!(!fetcher.is_live(Category::Crypto));
    }

    #[tokio::test]
    async fn test_missing_source_simulates() {
        let fetcher = FeedFetcher::new(Arc::new(MockGenerator::with_seed(1)));
        let result = fetcher
            .fetch_one(&SymbolRequest::new("EURUSD", Category::Forex), Period::YearToDate)
            .await;
        assert!(matches!(result.outcome, FeedOutcome::Simulated(_)));
        assert_eq!(result.point().unwrap().label, "EUR/USD");
    }

    #[tokio::test]
    async fn test_strict_policy_leaves_entry_empty() {
        let source = Arc::new(ScriptedPriceSource::new());
        source.set_error("BTC", "HTTP 500");

        let fetcher = fetcher_with(source).with_policy(FallbackPolicy::Unavailable);
        let result = fetcher.fetch_one(&crypto("BTC"), Period::Recent).await;

        assert!(result.failed());
        assert!(result.point().is_none());
        assert!(result.had_error());
    }

    #[tokio::test]
    async fn test_fetch_period_data_never_fails() {
        let source = Arc::new(ScriptedPriceSource::new());
        source.set_error("BTC", "timeout");

        let fetcher = fetcher_with(source).with_policy(FallbackPolicy::Unavailable);
        let point = fetcher.fetch_period_data(&crypto("BTC"), Period::YearToDate).await;
        assert_eq!(point.label, "Bitcoin");
        assert!(point.current_value.is_finite());
        assert!(point.previous_value.is_finite());
    }

    #[tokio::test]
    async fn test_non_finite_live_value_falls_back() {
        let source = Arc::new(ScriptedPriceSource::new());
        source.set_values("BTC", f64::NAN, 100.0);

        let fetcher = fetcher_with(source);
        let result = fetcher.fetch_one(&crypto("BTC"), Period::Recent).await;
        assert!(matches!(result.outcome, FeedOutcome::Fallback { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_serves_live_points_until_expiry() {
        let source = Arc::new(ScriptedPriceSource::new());
        source.set_values("BTC", 110.0, 100.0);
        source.set_error("ETH", "down");

        let cache = Arc::new(ResponseCache::new(Duration::from_secs(60)));
        let fetcher = fetcher_with(source.clone()).with_cache(cache.clone());
        let requests = vec![crypto("BTC"), crypto("ETH")];

        fetcher.fetch_all(&requests, Period::Recent).await;
        fetcher.fetch_all(&requests, Period::Recent).await;

        // BTC once (then cached), ETH every time (fallbacks are not cached).
        let btc_calls = |s: &ScriptedPriceSource| s.calls().iter().filter(|(sym, _)| sym == "BTC").count();
        assert_eq!(btc_calls(&source), 1);
        assert_eq!(source.call_count(), 3);
        assert_eq!(cache.len(), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        let results = fetcher.fetch_all(&requests, Period::Recent).await;
        assert_eq!(btc_calls(&source), 2);
        assert!(matches!(results[0].outcome, FeedOutcome::Live(_)));
    }
}
