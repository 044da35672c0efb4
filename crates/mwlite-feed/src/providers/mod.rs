//! Concrete upstream providers.

pub mod coingecko;
pub mod fmp;
pub mod treasury;

pub use coingecko::{CoinGeckoSource, COINGECKO_BASE_URL};
pub use fmp::{FmpClient, FmpQuoteSource, FMP_BASE_URL};
pub use treasury::TreasurySource;
