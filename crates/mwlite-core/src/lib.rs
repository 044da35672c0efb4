//! Core domain types for MarketWatch Lite.
//!
//! This crate provides the types shared by every other crate:
//! - `Category`, `Period`: what is being fetched and against which window
//! - `SymbolRequest`, `Feed`: caller-defined, validated inputs
//! - `PricePoint`, `FeedResult`: one fetched value and its outcome
//! - `percent_change`, `Sentiment`: the change arithmetic

pub mod change;
pub mod error;
pub mod feed;
pub mod point;
pub mod types;

pub use change::{absolute_change, percent_change, Sentiment, SENTIMENT_THRESHOLD_PCT};
pub use error::{CoreError, Result};
pub use feed::{Feed, FeedSnapshot};
pub use point::{FeedOutcome, FeedResult, PricePoint};
pub use types::{Category, Period, SymbolRequest};
