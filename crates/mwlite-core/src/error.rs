//! Error types for mwlite-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid feed: {0}")]
    InvalidFeed(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
