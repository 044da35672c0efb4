//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] mwlite_core::CoreError),

    #[error("Feed error: {0}")]
    Feed(#[from] mwlite_feed::FetchError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] mwlite_telemetry::TelemetryError),

    #[error("Dashboard error: {0}")]
    Dashboard(#[from] mwlite_dashboard::DashboardError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
