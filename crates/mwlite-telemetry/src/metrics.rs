//! Prometheus metrics for MarketWatch Lite.
//!
//! Covers:
//! - Refresh cycles per feed
//! - Per-symbol fetch outcomes and upstream latency
//! - Response cache hits
//! - Feed sentiment
//! - Dashboard clients
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure here means duplicate
//! metric names, which must crash at startup. These panics only occur
//! during static initialization, never at runtime.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, register_int_gauge,
    CounterVec, Encoder, GaugeVec, HistogramVec, IntGauge, TextEncoder,
};

/// Completed refresh cycles.
/// Labels: feed
pub static REFRESH_CYCLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "mwlite_refresh_cycles_total",
        "Completed refresh cycles",
        &["feed"]
    )
    .unwrap()
});

/// Refresh cycles in which at least one symbol errored.
/// Labels: feed
pub static REFRESH_ERROR_CYCLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "mwlite_refresh_error_cycles_total",
        "Refresh cycles with at least one failed symbol",
        &["feed"]
    )
    .unwrap()
});

/// Per-symbol fetch outcomes.
/// Labels: category, outcome (live/simulated/fallback/unavailable)
pub static FETCH_OUTCOMES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "mwlite_fetch_outcomes_total",
        "Per-symbol fetch outcomes",
        &["category", "outcome"]
    )
    .unwrap()
});

/// Upstream request latency in milliseconds.
pub static FETCH_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "mwlite_fetch_latency_ms",
        "Upstream provider latency in milliseconds",
        &["category"],
        vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Response cache hits.
pub static CACHE_HITS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "mwlite_cache_hits_total",
        "Live values served from the response cache",
        &["category"]
    )
    .unwrap()
});

/// Feed sentiment (1 = positive, 0 = neutral, -1 = negative).
pub static FEED_SENTIMENT: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "mwlite_feed_sentiment",
        "Feed sentiment (1=positive, 0=neutral, -1=negative)",
        &["feed"]
    )
    .unwrap()
});

/// Average percent change of a feed's displayable symbols.
pub static FEED_AVG_CHANGE_PCT: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "mwlite_feed_avg_change_pct",
        "Average percent change across a feed",
        &["feed"]
    )
    .unwrap()
});

/// Connected dashboard WebSocket clients.
pub static DASHBOARD_CLIENTS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "mwlite_dashboard_clients",
        "Connected dashboard WebSocket clients"
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a completed refresh cycle.
    pub fn refresh_cycle(feed: &str, had_errors: bool) {
        REFRESH_CYCLES_TOTAL.with_label_values(&[feed]).inc();
        if had_errors {
            REFRESH_ERROR_CYCLES_TOTAL.with_label_values(&[feed]).inc();
        }
    }

    /// Record one symbol's outcome.
    pub fn fetch_outcome(category: &str, outcome: &str) {
        FETCH_OUTCOMES_TOTAL
            .with_label_values(&[category, outcome])
            .inc();
    }

    /// Record upstream latency.
    pub fn fetch_latency(category: &str, latency_ms: f64) {
        FETCH_LATENCY_MS
            .with_label_values(&[category])
            .observe(latency_ms);
    }

    pub fn cache_hit(category: &str) {
        CACHE_HITS_TOTAL.with_label_values(&[category]).inc();
    }

    /// Set feed sentiment gauge and, when defined, the average change.
    pub fn feed_sentiment(feed: &str, gauge: f64, average_pct: Option<f64>) {
        FEED_SENTIMENT.with_label_values(&[feed]).set(gauge);
        if let Some(avg) = average_pct.filter(|v| v.is_finite()) {
            FEED_AVG_CHANGE_PCT.with_label_values(&[feed]).set(avg);
        }
    }

    pub fn dashboard_client_connected() {
        DASHBOARD_CLIENTS.inc();
    }

    pub fn dashboard_client_disconnected() {
        DASHBOARD_CLIENTS.dec();
    }
}

/// Render every registered metric in the Prometheus text format.
pub fn gather() -> TelemetryResult<String> {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cycle_counts_errors_separately() {
        let before = REFRESH_ERROR_CYCLES_TOTAL
            .with_label_values(&["metrics-test"])
            .get();
        Metrics::refresh_cycle("metrics-test", false);
        Metrics::refresh_cycle("metrics-test", true);
        assert_eq!(
            REFRESH_ERROR_CYCLES_TOTAL
                .with_label_values(&["metrics-test"])
                .get(),
            before + 1.0
        );
    }

    #[test]
    fn test_sentiment_ignores_non_finite_average() {
        Metrics::feed_sentiment("sentiment-test", 1.0, Some(2.5));
        Metrics::feed_sentiment("sentiment-test", 1.0, Some(f64::INFINITY));
        assert_eq!(
            FEED_AVG_CHANGE_PCT
                .with_label_values(&["sentiment-test"])
                .get(),
            2.5
        );
    }

    #[test]
    fn test_gather_renders_registered_metrics() {
        Metrics::fetch_outcome("crypto", "live");
        let text = gather().unwrap();
        assert!(text.contains("mwlite_fetch_outcomes_total"));
    }
}
