//! MarketWatch Lite.
//!
//! Main application that wires the components together:
//! - Provider sources and the mock-backed feed fetcher
//! - One interval refresher per configured feed
//! - Dashboard state, error banner and the HTTP/WebSocket server

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
