//! Price fetching for MarketWatch Lite.
//!
//! Provides:
//! - `PriceSource` trait and the concrete upstream providers
//! - Per-symbol mock fallback (`FeedFetcher`)
//! - Time-boxed response cache
//! - Interval refresh with cancellation (`FeedRefresher`)

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod providers;
pub mod refresh;
pub mod source;

pub use cache::ResponseCache;
pub use error::{FetchError, FetchResult};
pub use fetcher::{FallbackPolicy, FeedFetcher};
pub use http::HttpClient;
pub use providers::{CoinGeckoSource, FmpClient, FmpQuoteSource, TreasurySource};
pub use refresh::{ErrorCallback, FeedRefresher, RefreshHandle};
pub use source::{BoxFuture, DynPriceSource, PriceSource, ScriptedPriceSource};
