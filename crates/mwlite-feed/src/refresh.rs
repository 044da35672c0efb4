//! Interval refresh of one feed.
//!
//! A refresher fetches immediately on spawn, then once per interval, and
//! again as soon as the selected period changes. Each cycle publishes a
//! whole `FeedSnapshot`. The task ends when its handle is stopped or
//! dropped, or when the parent token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use mwlite_core::{Feed, FeedSnapshot, Period};
use mwlite_telemetry::Metrics;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::fetcher::FeedFetcher;

/// Called once per cycle in which at least one symbol errored.
pub type ErrorCallback = Arc<dyn Fn(&FeedSnapshot) + Send + Sync>;

/// Latest snapshot; `None` until the first cycle completes.
pub type SnapshotReceiver = watch::Receiver<Option<Arc<FeedSnapshot>>>;

/// Shortest refresh interval; `tokio::time::interval` rejects zero.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Builder for a feed's refresh task.
pub struct FeedRefresher {
    feed: Feed,
    fetcher: Arc<FeedFetcher>,
    interval: Duration,
    period_rx: watch::Receiver<Period>,
    on_error: Option<ErrorCallback>,
}

impl FeedRefresher {
    /// `interval` is clamped to at least `MIN_INTERVAL`.
    pub fn new(
        feed: Feed,
        fetcher: Arc<FeedFetcher>,
        interval: Duration,
        period_rx: watch::Receiver<Period>,
    ) -> Self {
        Self {
            feed,
            fetcher,
            interval: interval.max(MIN_INTERVAL),
            period_rx,
            on_error: None,
        }
    }

    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    /// Spawn the refresh task with its own cancellation token.
    pub fn spawn(self) -> RefreshHandle {
        self.spawn_with_token(CancellationToken::new())
    }

    /// Spawn the refresh task; cancelling `parent` stops it too.
    pub fn spawn_child(self, parent: &CancellationToken) -> RefreshHandle {
        self.spawn_with_token(parent.child_token())
    }

    fn spawn_with_token(self, token: CancellationToken) -> RefreshHandle {
        let (tx, rx) = watch::channel(None);
        let feed = self.feed.name().to_string();
        let task = tokio::spawn(self.run(token.clone(), tx));
        RefreshHandle {
            feed,
            token,
            snapshots: rx,
            task: Some(task),
        }
    }

    async fn run(self, token: CancellationToken, tx: watch::Sender<Option<Arc<FeedSnapshot>>>) {
        let Self {
            feed,
            fetcher,
            interval,
            mut period_rx,
            on_error,
        } = self;

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut period_open = true;
        let mut cycle: u64 = 0;

        info!(feed = %feed.name(), interval_ms = interval.as_millis() as u64, "Refresher started");

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {}
                changed = period_rx.changed(), if period_open => {
                    if changed.is_err() {
                        // Period sender gone; keep refreshing with the last value.
                        period_open = false;
                        continue;
                    }
                    debug!(feed = %feed.name(), "Period changed, refreshing now");
                    ticker.reset();
                }
            }

            let period = *period_rx.borrow_and_update();
            let results = tokio::select! {
                () = token.cancelled() => break,
                results = fetcher.fetch_all(feed.requests(), period) => results,
            };

            cycle += 1;
            let snapshot = FeedSnapshot {
                feed: feed.name().to_string(),
                period,
                cycle,
                fetched_at: Utc::now(),
                results,
            };

            let has_errors = snapshot.has_errors();
            Metrics::refresh_cycle(feed.name(), has_errors);
            if has_errors {
                warn!(
                    feed = %feed.name(),
                    cycle,
                    errors = snapshot.error_count(),
                    total = snapshot.results.len(),
                    "Refresh cycle had errors"
                );
                if let Some(callback) = &on_error {
                    callback(&snapshot);
                }
            } else {
                debug!(feed = %feed.name(), cycle, period = %period, "Refresh cycle complete");
            }

            if tx.send(Some(Arc::new(snapshot))).is_err() {
                // Every receiver is gone, including the handle's.
                break;
            }
        }

        info!(feed = %feed.name(), cycles = cycle, "Refresher stopped");
    }
}

/// Owner of a running refresh task.
///
/// Dropping the handle cancels the task.
pub struct RefreshHandle {
    feed: String,
    token: CancellationToken,
    snapshots: SnapshotReceiver,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    pub fn feed(&self) -> &str {
        &self.feed
    }

    /// Receiver of published snapshots.
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.snapshots.clone()
    }

    /// Most recent snapshot, if a cycle has completed.
    pub fn latest(&self) -> Option<Arc<FeedSnapshot>> {
        self.snapshots.borrow().clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel the task and wait for it to exit.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(feed = %self.feed, error = %e, "Refresher task ended abnormally");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedPriceSource;
    use mwlite_core::{Category, SymbolRequest};
    use mwlite_mock::MockGenerator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INTERVAL: Duration = Duration::from_secs(30);

    fn crypto_feed() -> Feed {
        Feed::new(
            "Crypto",
            vec![
                SymbolRequest::new("BTC", Category::Crypto),
                SymbolRequest::new("ETH", Category::Crypto),
                SymbolRequest::new("SOL", Category::Crypto),
            ],
        )
        .unwrap()
    }

    fn fetcher(source: Arc<ScriptedPriceSource>) -> Arc<FeedFetcher> {
        Arc::new(
            FeedFetcher::new(Arc::new(MockGenerator::with_seed(2)))
                .with_source(Category::Crypto, source),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_callback_fires_once_per_cycle() {
        let source = Arc::new(ScriptedPriceSource::new());
        source.set_values("BTC", 110.0, 100.0);
        source.set_error("ETH", "down");
        source.set_error("SOL", "down");

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let (_period_tx, period_rx) = watch::channel(Period::Recent);

        let handle = FeedRefresher::new(crypto_feed(), fetcher(source), INTERVAL, period_rx)
            .on_error(Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .spawn();

        let mut rx = handle.subscribe();
        for expected_cycle in 1..=3 {
            rx.changed().await.unwrap();
            let snapshot = rx.borrow_and_update().clone().unwrap();
            assert_eq!(snapshot.cycle, expected_cycle);
            assert_eq!(snapshot.results.len(), 3);
            assert_eq!(snapshot.error_count(), 2);
            assert_eq!(fired.load(Ordering::SeqCst), expected_cycle as usize);
        }

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_callback_without_errors() {
        let source = Arc::new(ScriptedPriceSource::new());
        for symbol in ["BTC", "ETH", "SOL"] {
            source.set_values(symbol, 101.0, 100.0);
        }
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let (_period_tx, period_rx) = watch::channel(Period::Recent);

        let handle = FeedRefresher::new(crypto_feed(), fetcher(source), INTERVAL, period_rx)
            .on_error(Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .spawn();

        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        assert!(!handle.latest().unwrap().has_errors());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_fetches() {
        let source = Arc::new(ScriptedPriceSource::new());
        let (_period_tx, period_rx) = watch::channel(Period::Recent);
        let handle =
            FeedRefresher::new(crypto_feed(), fetcher(source.clone()), INTERVAL, period_rx).spawn();

        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        let calls_at_stop = source.call_count();
        assert_eq!(calls_at_stop, 3);

        handle.stop().await;
        tokio::time::sleep(INTERVAL * 5).await;
        assert_eq!(source.call_count(), calls_at_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_task() {
        let source = Arc::new(ScriptedPriceSource::new());
        let (_period_tx, period_rx) = watch::channel(Period::Recent);
        let handle =
            FeedRefresher::new(crypto_feed(), fetcher(source.clone()), INTERVAL, period_rx).spawn();

        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        drop(handle);

        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let source = Arc::new(ScriptedPriceSource::new());
        let (_period_tx, period_rx) = watch::channel(Period::Recent);
        let refresher =
            FeedRefresher::new(crypto_feed(), fetcher(source), Duration::ZERO, period_rx);
        assert_eq!(refresher.interval, MIN_INTERVAL);

        let handle = refresher.spawn();
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        rx.changed().await.unwrap();
        assert!(handle.latest().unwrap().cycle >= 2);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_token_cancels_children() {
        let source = Arc::new(ScriptedPriceSource::new());
        let (_period_tx, period_rx) = watch::channel(Period::Recent);
        let parent = CancellationToken::new();
        let handle = FeedRefresher::new(crypto_feed(), fetcher(source), INTERVAL, period_rx)
            .spawn_child(&parent);

        parent.cancel();
        assert!(handle.is_stopped());
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_period_change_refetches_immediately() {
        let source = Arc::new(ScriptedPriceSource::new());
        let (period_tx, period_rx) = watch::channel(Period::Recent);
        let handle =
            FeedRefresher::new(crypto_feed(), fetcher(source.clone()), INTERVAL, period_rx).spawn();

        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        assert_eq!(handle.latest().unwrap().period, Period::Recent);

        let switched_at = tokio::time::Instant::now();
        period_tx.send(Period::YearToDate).unwrap();
        rx.changed().await.unwrap();

        let snapshot = handle.latest().unwrap();
        assert_eq!(snapshot.period, Period::YearToDate);
        assert_eq!(snapshot.cycle, 2);
        assert!(switched_at.elapsed() < INTERVAL);
        assert!(source
            .calls()
            .iter()
            .any(|(_, period)| *period == Period::YearToDate));

        handle.stop().await;
    }
}
