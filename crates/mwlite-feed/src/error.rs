//! Fetch error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    #[error("Source not configured: {0}")]
    Unconfigured(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl FetchError {
    /// Short tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Malformed(_) => "malformed",
            FetchError::UnsupportedSymbol(_) => "unsupported_symbol",
            FetchError::Unconfigured(_) => "unconfigured",
            FetchError::HttpClient(_) => "http_client",
        }
    }

    /// True for a 404 or 400 response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 400 | 404, .. })
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
