//! Dashboard API types.
//!
//! These types are used for JSON serialization in REST and WebSocket APIs.

use chrono::{DateTime, Utc};
use mwlite_core::Period;
use mwlite_presenter::{ChartPoint, FeedSummary};
use serde::Serialize;

/// Full dashboard state (sent on initial connection and via REST).
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Timestamp when snapshot was taken (Unix milliseconds).
    pub timestamp_ms: i64,
    pub period: Period,
    pub period_label: String,
    /// Feed summaries in configuration order.
    pub feeds: Vec<FeedSummary>,
    /// Every item of every feed, for the consolidated chart.
    pub overview: Vec<ChartPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_banner: Option<ErrorBanner>,
}

/// Notice that some data failed to load.
///
/// Raised by a feed's error callback; cleared once every listed feed has
/// completed a clean cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBanner {
    pub message: String,
    /// Feeds whose latest cycle had errors.
    pub feeds: Vec<String>,
    pub raised_at: DateTime<Utc>,
}

/// WebSocket message types (tagged enum for type safety).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardMessage {
    /// Full snapshot (sent on connect).
    Snapshot(DashboardSnapshot),
    /// Periodic update.
    Update {
        timestamp_ms: i64,
        feeds: Vec<FeedSummary>,
        overview: Vec<ChartPoint>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_banner: Option<ErrorBanner>,
    },
    /// The global period was switched.
    PeriodChanged { period: Period, period_label: String },
}

/// Error body of REST responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
