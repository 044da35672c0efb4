//! Per-item views and feed summaries.

use chrono::{DateTime, Utc};
use mwlite_core::{Category, Feed, FeedResult, FeedSnapshot, Period, Sentiment, SymbolRequest};
use serde::Serialize;

use crate::format::{change_text, display_value, percent_text};

/// Direction of an item's change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Up
        } else if change < 0.0 {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

/// What an item shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ItemState {
    Ready {
        current_value: f64,
        previous_value: f64,
        display_value: String,
        absolute_change: f64,
        change_text: String,
        /// Non-finite values serialize as `null`; `percent_text` carries
        /// the infinity sign.
        percent_change: f64,
        percent_text: String,
        trend: Trend,
        /// Point comes from the mock generator.
        mock: bool,
        /// Error of the failed live attempt this point stands in for.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Live attempt failed and nothing was substituted.
    Error { message: String },
    /// No refresh cycle has completed yet.
    NoData,
}

/// One symbol as displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    /// Identifier as requested.
    pub id: String,
    pub label: String,
    pub category: Category,
    #[serde(flatten)]
    pub state: ItemState,
}

impl ItemView {
    /// Build the view of one fetched result.
    pub fn from_result(result: &FeedResult) -> Self {
        let request = &result.request;
        match result.point() {
            Some(point) => {
                let absolute = point.absolute_change();
                let percent = point.percent_change();
                Self {
                    id: request.identifier().to_string(),
                    label: point.label.clone(),
                    category: request.category(),
                    state: ItemState::Ready {
                        current_value: point.current_value,
                        previous_value: point.previous_value,
                        display_value: display_value(request.category(), point.current_value),
                        absolute_change: absolute,
                        change_text: change_text(request.category(), absolute),
                        percent_change: percent,
                        percent_text: percent_text(percent),
                        trend: Trend::from_change(absolute),
                        mock: result.is_mock(),
                        error: result.error().map(str::to_string),
                    },
                }
            }
            None => Self {
                id: request.identifier().to_string(),
                label: request.identifier().to_string(),
                category: request.category(),
                state: ItemState::Error {
                    message: result.error().unwrap_or("no data").to_string(),
                },
            },
        }
    }

    /// Placeholder for a symbol that has not been fetched yet.
    pub fn no_data(request: &SymbolRequest) -> Self {
        Self {
            id: request.identifier().to_string(),
            label: request.identifier().to_string(),
            category: request.category(),
            state: ItemState::NoData,
        }
    }

    /// Percent change, when the item has a value.
    pub fn percent_change(&self) -> Option<f64> {
        match self.state {
            ItemState::Ready { percent_change, .. } => Some(percent_change),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ItemState::Ready { .. })
    }
}

/// Display-ready state of one feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSummary {
    pub feed: String,
    pub period: Period,
    /// `24h` or `YTD`.
    pub period_label: String,
    /// Refresh cycle the summary was built from; `None` before the first.
    pub cycle: Option<u64>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub items: Vec<ItemView>,
    pub sentiment: Sentiment,
    /// Average percent change of the items with a value.
    pub average_change_pct: Option<f64>,
    pub has_errors: bool,
    pub error_count: usize,
}

/// Summarize one completed refresh cycle.
///
/// Sentiment averages every item with a value, mock-backed ones included.
pub fn summarize(snapshot: &FeedSnapshot) -> FeedSummary {
    let items: Vec<ItemView> = snapshot.results.iter().map(ItemView::from_result).collect();
    let (sentiment, average_change_pct) =
        Sentiment::from_changes(items.iter().filter_map(ItemView::percent_change));

    FeedSummary {
        feed: snapshot.feed.clone(),
        period: snapshot.period,
        period_label: snapshot.period.label().to_string(),
        cycle: Some(snapshot.cycle),
        fetched_at: Some(snapshot.fetched_at),
        items,
        sentiment,
        average_change_pct,
        has_errors: snapshot.has_errors(),
        error_count: snapshot.error_count(),
    }
}

/// Summary shown before a feed's first cycle completes.
pub fn pending(feed: &Feed, period: Period) -> FeedSummary {
    FeedSummary {
        feed: feed.name().to_string(),
        period,
        period_label: period.label().to_string(),
        cycle: None,
        fetched_at: None,
        items: feed.requests().iter().map(ItemView::no_data).collect(),
        sentiment: Sentiment::Neutral,
        average_change_pct: None,
        has_errors: false,
        error_count: 0,
    }
}
