//! Dashboard state management.
//!
//! DashboardState holds the latest summary of every feed, the global period
//! selector and the error banner. Refresh tasks write into it; HTTP and
//! WebSocket handlers read whole snapshots out of it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use mwlite_core::{Feed, FeedSnapshot, Period};
use mwlite_presenter::{chart_series, pending, summarize, FeedSummary};
use mwlite_telemetry::Metrics;
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::types::{DashboardSnapshot, ErrorBanner};

/// Banner text shown while any feed is failing.
pub const ERROR_BANNER_MESSAGE: &str =
    "Some market data could not be loaded. Showing simulated values where available.";

/// Shared dashboard state.
#[derive(Clone)]
pub struct DashboardState {
    /// Configured feeds, in display order.
    feeds: Arc<Vec<Feed>>,
    /// Latest summary per feed name.
    summaries: Arc<RwLock<HashMap<String, FeedSummary>>>,
    /// Global 24h/YTD selector; refreshers subscribe to it.
    period_tx: Arc<watch::Sender<Period>>,
    error_banner: Arc<RwLock<Option<ErrorBanner>>>,
}

impl DashboardState {
    /// Create state for `feeds`, all pending, driven by `period_tx`.
    pub fn new(feeds: Vec<Feed>, period_tx: watch::Sender<Period>) -> Self {
        let period = *period_tx.borrow();
        let summaries = feeds
            .iter()
            .map(|feed| (feed.name().to_string(), pending(feed, period)))
            .collect();

        Self {
            feeds: Arc::new(feeds),
            summaries: Arc::new(RwLock::new(summaries)),
            period_tx: Arc::new(period_tx),
            error_banner: Arc::new(RwLock::new(None)),
        }
    }

    pub fn feeds(&self) -> &[Feed] {
        &self.feeds
    }

    pub fn period(&self) -> Period {
        *self.period_tx.borrow()
    }

    /// Receiver for refreshers that follow the global period.
    pub fn subscribe_period(&self) -> watch::Receiver<Period> {
        self.period_tx.subscribe()
    }

    /// Switch the global period. Returns false if it was already selected.
    pub fn set_period(&self, period: Period) -> bool {
        let changed = self.period_tx.send_if_modified(|current| {
            if *current == period {
                false
            } else {
                *current = period;
                true
            }
        });
        if changed {
            info!(period = %period, "Period switched");
        }
        changed
    }

    /// Store the summary of a completed cycle.
    ///
    /// A clean cycle removes the feed from the error banner.
    pub fn apply_snapshot(&self, snapshot: &FeedSnapshot) {
        let summary = summarize(snapshot);
        Metrics::feed_sentiment(
            &summary.feed,
            summary.sentiment.as_gauge(),
            summary.average_change_pct,
        );
        debug!(
            feed = %summary.feed,
            cycle = snapshot.cycle,
            sentiment = %summary.sentiment,
            "Feed summary updated"
        );

        if !snapshot.has_errors() {
            self.clear_error(&snapshot.feed);
        }
        self.summaries.write().insert(snapshot.feed.clone(), summary);
    }

    /// Raise the error banner for the snapshot's feed.
    pub fn raise_error(&self, snapshot: &FeedSnapshot) {
        let mut banner = self.error_banner.write();
        let banner = banner.get_or_insert_with(|| ErrorBanner {
            message: ERROR_BANNER_MESSAGE.to_string(),
            feeds: Vec::new(),
            raised_at: Utc::now(),
        });
        if !banner.feeds.iter().any(|f| f == &snapshot.feed) {
            banner.feeds.push(snapshot.feed.clone());
        }
    }

    fn clear_error(&self, feed: &str) {
        let mut banner = self.error_banner.write();
        if let Some(current) = banner.as_mut() {
            current.feeds.retain(|f| f != feed);
            if current.feeds.is_empty() {
                *banner = None;
            }
        }
    }

    pub fn error_banner(&self) -> Option<ErrorBanner> {
        self.error_banner.read().clone()
    }

    /// Latest summary of one feed (case-insensitive name match).
    pub fn feed_summary(&self, name: &str) -> Option<FeedSummary> {
        let summaries = self.summaries.read();
        summaries.get(name).cloned().or_else(|| {
            summaries
                .iter()
                .find(|(feed, _)| feed.eq_ignore_ascii_case(name))
                .map(|(_, summary)| summary.clone())
        })
    }

    /// Summaries in configuration order.
    pub fn collect_feeds(&self) -> Vec<FeedSummary> {
        let summaries = self.summaries.read();
        self.feeds
            .iter()
            .filter_map(|feed| summaries.get(feed.name()).cloned())
            .collect()
    }

    /// Collect a full snapshot of the current state.
    pub fn collect_snapshot(&self) -> DashboardSnapshot {
        let period = self.period();
        let feeds = self.collect_feeds();
        let overview = chart_series(feeds.iter().flat_map(|f| f.items.iter()), period);

        DashboardSnapshot {
            timestamp_ms: Utc::now().timestamp_millis(),
            period,
            period_label: period.label().to_string(),
            feeds,
            overview,
            error_banner: self.error_banner(),
        }
    }

    /// Apply every snapshot published on `rx` until cancelled or the
    /// publisher goes away.
    pub async fn follow(
        &self,
        mut rx: watch::Receiver<Option<Arc<FeedSnapshot>>>,
        token: CancellationToken,
    ) {
        loop {
            let latest = rx.borrow_and_update().clone();
            if let Some(snapshot) = latest {
                self.apply_snapshot(&snapshot);
            }
            tokio::select! {
                () = token.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mwlite_core::{Category, FeedOutcome, FeedResult, PricePoint, Sentiment, SymbolRequest};

    fn feeds() -> Vec<Feed> {
        vec![
            Feed::new("Crypto", vec![SymbolRequest::new("BTC", Category::Crypto)]).unwrap(),
            Feed::new(
                "Bonds",
                vec![SymbolRequest::new("US10Y", Category::Bond)],
            )
            .unwrap(),
        ]
    }

    fn snapshot(feed: &str, outcome: FeedOutcome) -> FeedSnapshot {
        FeedSnapshot {
            feed: feed.to_string(),
            period: Period::Recent,
            cycle: 1,
            fetched_at: Utc::now(),
            results: vec![FeedResult::new(
                SymbolRequest::new("BTC", Category::Crypto),
                outcome,
            )],
        }
    }

    fn state() -> DashboardState {
        let (tx, _rx) = watch::channel(Period::Recent);
        DashboardState::new(feeds(), tx)
    }

    #[test]
    fn test_initial_state_is_pending() {
        let state = state();
        let snapshot = state.collect_snapshot();
        assert_eq!(snapshot.feeds.len(), 2);
        assert_eq!(snapshot.feeds[0].feed, "Crypto");
        assert_eq!(snapshot.feeds[1].feed, "Bonds");
        assert!(snapshot.feeds.iter().all(|f| f.cycle.is_none()));
        assert_eq!(snapshot.overview.len(), 2);
        assert!(snapshot.error_banner.is_none());
    }

    #[test]
    fn test_apply_snapshot_replaces_summary() {
        let state = state();
        state.apply_snapshot(&snapshot(
            "Crypto",
            FeedOutcome::Live(PricePoint::new("BTC", 110.0, 100.0)),
        ));
        let summary = state.feed_summary("crypto").unwrap();
        assert_eq!(summary.cycle, Some(1));
        assert_eq!(summary.sentiment, Sentiment::Positive);
        assert!(state.feed_summary("Unknown").is_none());
    }

    #[test]
    fn test_error_banner_raised_and_cleared() {
        let state = state();
        let failing = snapshot(
            "Crypto",
            FeedOutcome::Fallback {
                point: PricePoint::new("BTC", 1.0, 1.0),
                error: "timeout".to_string(),
            },
        );
        state.raise_error(&failing);
        state.raise_error(&failing);
        state.apply_snapshot(&failing);

        let banner = state.error_banner().unwrap();
        assert_eq!(banner.feeds, vec!["Crypto".to_string()]);

        state.apply_snapshot(&snapshot(
            "Crypto",
            FeedOutcome::Live(PricePoint::new("BTC", 1.0, 1.0)),
        ));
        assert!(state.error_banner().is_none());
    }

    #[test]
    fn test_set_period_notifies_subscribers() {
        let state = state();
        let mut rx = state.subscribe_period();
        assert!(!state.set_period(Period::Recent));
        assert!(!rx.has_changed().unwrap());

        assert!(state.set_period(Period::YearToDate));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Period::YearToDate);
        assert_eq!(state.collect_snapshot().period_label, "YTD");
    }

    #[tokio::test]
    async fn test_follow_applies_published_snapshots() {
        let state = state();
        let (tx, rx) = watch::channel(None);
        let token = CancellationToken::new();

        let follower = {
            let state = state.clone();
            let token = token.clone();
            tokio::spawn(async move { state.follow(rx, token).await })
        };

        tx.send(Some(Arc::new(snapshot(
            "Bonds",
            FeedOutcome::Live(PricePoint::new("US 10-Year Treasury", 4.2, 4.25)),
        ))))
        .unwrap();
        drop(tx);
        follower.await.unwrap();

        assert_eq!(state.feed_summary("Bonds").unwrap().cycle, Some(1));
        token.cancel();
    }
}
