//! Main application orchestration.
//!
//! Coordinates all components:
//! - Provider sources behind one mock-backed `FeedFetcher`
//! - One refresher per feed, following the global period
//! - Dashboard state updates and the error banner
//! - The dashboard HTTP/WebSocket server

use std::sync::Arc;
use std::time::Duration;

use mwlite_core::{Category, Feed, FeedSnapshot};
use mwlite_dashboard::{run_server, DashboardState};
use mwlite_feed::{
    CoinGeckoSource, FeedFetcher, FeedRefresher, FmpClient, FmpQuoteSource, HttpClient,
    RefreshHandle, ResponseCache, TreasurySource,
};
use mwlite_mock::MockGenerator;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Build the fetcher with every provider registered.
pub fn build_fetcher(config: &AppConfig) -> AppResult<FeedFetcher> {
    let http = HttpClient::new(config.providers.http_timeout())?;
    let mock = Arc::new(match config.mock_seed {
        Some(seed) => MockGenerator::with_seed(seed),
        None => MockGenerator::new(),
    });

    let fmp = Arc::new(FmpClient::new(
        http.clone(),
        config.providers.fmp_base_url.clone(),
        config.providers.fmp_api_key.clone(),
    ));
    if !fmp.is_configured() {
        warn!("FMP API key not configured, indices, forex and bonds will be simulated");
    }
    let coingecko = CoinGeckoSource::new(
        http,
        config.providers.coingecko_base_url.clone(),
        config.providers.coingecko_api_key.clone(),
    );

    let mut fetcher = FeedFetcher::new(mock)
        .with_source(Category::Crypto, Arc::new(coingecko))
        .with_source(
            Category::EquityIndex,
            Arc::new(FmpQuoteSource::indices(Arc::clone(&fmp))),
        )
        .with_source(Category::Forex, Arc::new(FmpQuoteSource::forex(Arc::clone(&fmp))))
        .with_source(Category::Bond, Arc::new(TreasurySource::new(fmp)))
        .with_policy(config.fallback);

    if config.cache_ttl_secs > 0 {
        fetcher = fetcher.with_cache(Arc::new(ResponseCache::new(config.cache_ttl())));
    }
    Ok(fetcher)
}

/// Main application.
pub struct Application {
    config: AppConfig,
    feeds: Vec<Feed>,
    fetcher: Arc<FeedFetcher>,
    dashboard_state: DashboardState,
    shutdown: CancellationToken,
}

impl Application {
    /// Create a new application with the providers named in `config`.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let fetcher = build_fetcher(&config)?;
        Self::with_fetcher(config, fetcher)
    }

    /// Create an application around an already assembled fetcher.
    pub fn with_fetcher(config: AppConfig, fetcher: FeedFetcher) -> AppResult<Self> {
        let feeds = config.build_feeds()?;
        let (period_tx, _) = watch::channel(config.period);
        let dashboard_state = DashboardState::new(feeds.clone(), period_tx);

        Ok(Self {
            config,
            feeds,
            fetcher: Arc::new(fetcher),
            dashboard_state,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn dashboard_state(&self) -> &DashboardState {
        &self.dashboard_state
    }

    /// Token that stops `run` when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until Ctrl-C, until the shutdown token is cancelled, or until the
    /// dashboard server fails.
    pub async fn run(self) -> AppResult<()> {
        let Self {
            config,
            feeds,
            fetcher,
            dashboard_state,
            shutdown,
        } = self;

        info!(
            feeds = feeds.len(),
            period = %dashboard_state.period(),
            refresh_interval_secs = config.refresh_interval_secs,
            "Starting application"
        );

        let mut handles = Vec::with_capacity(feeds.len());
        let mut followers = Vec::with_capacity(feeds.len());
        for feed in feeds {
            let handle = spawn_refresher(feed, &fetcher, &config, &dashboard_state, &shutdown);

            let state = dashboard_state.clone();
            let rx = handle.subscribe();
            let token = shutdown.child_token();
            followers.push(tokio::spawn(async move { state.follow(rx, token).await }));
            handles.push(handle);
        }

        let purge_task = fetcher
            .cache()
            .map(|cache| spawn_cache_purge(Arc::clone(cache), shutdown.child_token()));

        let server_task = if config.dashboard.enabled {
            Some(spawn_dashboard(&config, dashboard_state.clone(), &shutdown))
        } else {
            info!("Dashboard disabled");
            None
        };

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Shutdown signal received"),
                    Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
                }
            }
            () = shutdown.cancelled() => {
                info!("Shutdown requested");
            }
        }

        // Cleanup
        shutdown.cancel();
        for handle in handles {
            handle.stop().await;
        }
        for follower in followers {
            if let Err(e) = follower.await {
                warn!(error = %e, "Snapshot follower ended abnormally");
            }
        }
        if let Some(task) = purge_task {
            task.abort();
        }

        let result = match server_task {
            Some(task) => match task.await {
                Ok(result) => result.map_err(AppError::from),
                Err(e) => {
                    error!(error = %e, "Dashboard task panicked");
                    Ok(())
                }
            },
            None => Ok(()),
        };

        info!("Shutdown complete");
        result
    }
}

fn spawn_refresher(
    feed: Feed,
    fetcher: &Arc<FeedFetcher>,
    config: &AppConfig,
    dashboard_state: &DashboardState,
    shutdown: &CancellationToken,
) -> RefreshHandle {
    let state = dashboard_state.clone();
    let on_error = Arc::new(move |snapshot: &FeedSnapshot| {
        warn!(
            feed = %snapshot.feed,
            cycle = snapshot.cycle,
            errors = snapshot.error_count(),
            "Feed cycle had errors"
        );
        state.raise_error(snapshot);
    });

    FeedRefresher::new(
        feed,
        Arc::clone(fetcher),
        config.refresh_interval(),
        dashboard_state.subscribe_period(),
    )
    .on_error(on_error)
    .spawn_child(shutdown)
}

fn spawn_cache_purge(cache: Arc<ResponseCache>, token: CancellationToken) -> JoinHandle<()> {
    let period = cache.ttl().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = interval.tick() => {
                    let purged = cache.purge_expired();
                    if purged > 0 {
                        debug!(purged, remaining = cache.len(), "Purged expired cache entries");
                    }
                }
            }
        }
    })
}

/// Spawn the dashboard server; a server failure shuts the application down.
fn spawn_dashboard(
    config: &AppConfig,
    dashboard_state: DashboardState,
    shutdown: &CancellationToken,
) -> JoinHandle<mwlite_dashboard::DashboardResult<()>> {
    let dashboard_config = config.dashboard.clone();
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        let result = run_server(dashboard_state, dashboard_config, shutdown.child_token()).await;
        if let Err(e) = &result {
            error!(error = %e, "Dashboard server failed");
            shutdown.cancel();
        }
        result
    })
}
