//! Fetched values and per-symbol outcomes.

use crate::change::{absolute_change, percent_change};
use crate::types::SymbolRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed value and the value it is compared against.
///
/// Changes are always derived from the two values, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Display label (e.g. "S&P 500", "BTC").
    pub label: String,
    /// Latest value.
    pub current_value: f64,
    /// Prior-day close or start-of-year close, depending on the period.
    pub previous_value: f64,
    /// When the current value was observed.
    pub as_of: DateTime<Utc>,
}

impl PricePoint {
    /// Create a point observed now.
    pub fn new(label: impl Into<String>, current_value: f64, previous_value: f64) -> Self {
        Self::at(label, current_value, previous_value, Utc::now())
    }

    /// Create a point observed at `as_of`.
    pub fn at(
        label: impl Into<String>,
        current_value: f64,
        previous_value: f64,
        as_of: DateTime<Utc>,
    ) -> Self {
        Self {
            label: label.into(),
            current_value,
            previous_value,
            as_of,
        }
    }

    pub fn absolute_change(&self) -> f64 {
        absolute_change(self.current_value, self.previous_value)
    }

    pub fn percent_change(&self) -> f64 {
        percent_change(self.current_value, self.previous_value)
    }
}

/// How a symbol's value was obtained this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FeedOutcome {
    /// Fetched from the upstream provider (or served from the response cache).
    Live(PricePoint),
    /// Provider unconfigured; mock data by design, no live attempt made.
    Simulated(PricePoint),
    /// Live attempt failed; mock data substituted.
    Fallback { point: PricePoint, error: String },
    /// Live attempt failed and no substitute was produced.
    Unavailable { error: String },
}

/// Result for one requested symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedResult {
    pub request: SymbolRequest,
    pub outcome: FeedOutcome,
}

impl FeedResult {
    pub fn new(request: SymbolRequest, outcome: FeedOutcome) -> Self {
        Self { request, outcome }
    }

    /// The value to display, if any.
    pub fn point(&self) -> Option<&PricePoint> {
        match &self.outcome {
            FeedOutcome::Live(point)
            | FeedOutcome::Simulated(point)
            | FeedOutcome::Fallback { point, .. } => Some(point),
            FeedOutcome::Unavailable { .. } => None,
        }
    }

    /// True exactly when there is no point to display.
    pub fn failed(&self) -> bool {
        matches!(self.outcome, FeedOutcome::Unavailable { .. })
    }

    /// True when the live attempt for this symbol errored.
    pub fn had_error(&self) -> bool {
        matches!(
            self.outcome,
            FeedOutcome::Fallback { .. } | FeedOutcome::Unavailable { .. }
        )
    }

    /// True when the point comes from the mock generator.
    pub fn is_mock(&self) -> bool {
        matches!(
            self.outcome,
            FeedOutcome::Simulated(_) | FeedOutcome::Fallback { .. }
        )
    }

    /// Error text of a failed live attempt.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            FeedOutcome::Fallback { error, .. } | FeedOutcome::Unavailable { error } => {
                Some(error.as_str())
            }
            _ => None,
        }
    }

    /// Short outcome tag for logs and metric labels.
    pub fn outcome_tag(&self) -> &'static str {
        match self.outcome {
            FeedOutcome::Live(_) => "live",
            FeedOutcome::Simulated(_) => "simulated",
            FeedOutcome::Fallback { .. } => "fallback",
            FeedOutcome::Unavailable { .. } => "unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn request() -> SymbolRequest {
        SymbolRequest::new("ETH", Category::Crypto)
    }

    #[test]
    fn test_point_derived_changes() {
        let point = PricePoint::new("ETH", 110.0, 100.0);
        assert_eq!(point.absolute_change(), 10.0);
        assert!((point.percent_change() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_iff_no_point() {
        let live = FeedResult::new(request(), FeedOutcome::Live(PricePoint::new("ETH", 1.0, 1.0)));
        let fallback = FeedResult::new(
            request(),
            FeedOutcome::Fallback {
                point: PricePoint::new("ETH", 1.0, 1.0),
                error: "HTTP 500".to_string(),
            },
        );
        let unavailable = FeedResult::new(
            request(),
            FeedOutcome::Unavailable {
                error: "HTTP 500".to_string(),
            },
        );

        for result in [&live, &fallback, &unavailable] {
            assert_eq!(result.failed(), result.point().is_none());
        }

        assert!(!live.had_error());
        assert!(fallback.had_error() && fallback.is_mock());
        assert!(unavailable.had_error() && !unavailable.is_mock());
        assert_eq!(fallback.error(), Some("HTTP 500"));
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let result = FeedResult::new(
            request(),
            FeedOutcome::Unavailable {
                error: "timeout".to_string(),
            },
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"]["source"], "unavailable");
        assert_eq!(json["request"]["category"], "crypto");
    }
}
