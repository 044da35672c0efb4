//! Turns fetched feed snapshots into display-ready values.
//!
//! Nothing here fails: empty or failed input becomes an explicit
//! `Error` / `NoData` item state and a neutral sentiment.

pub mod aggregate;
pub mod chart;
pub mod format;

pub use aggregate::{pending, summarize, FeedSummary, ItemState, ItemView, Trend};
pub use chart::{chart_series, ChartPoint};
pub use format::{change_text, display_value, format_number, percent_text};
