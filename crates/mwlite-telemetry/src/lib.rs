//! Prometheus metrics and structured logging for MarketWatch Lite.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus metrics for refresh cycles, fetch outcomes and sentiment

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::{gather, Metrics};
