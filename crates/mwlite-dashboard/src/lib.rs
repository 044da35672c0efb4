//! mwlite-dashboard - Live dashboard for MarketWatch Lite.
//!
//! Serves the presented state of every feed over HTTP and WebSocket:
//!
//! - REST API for the current snapshot, one feed, and the period selector
//! - WebSocket pushing periodic updates and period switches
//! - Prometheus text exposition at `/metrics`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          mwlite process                          │
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │ FeedRefresher│  │ FeedRefresher│  │ FeedRefresher│  ...      │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           ▼ snapshots / error callback          │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │      DashboardState (summaries, period, error banner)      │  │
//! │  └──────────────────────────┬────────────────────────────────┘  │
//! │                             │                                   │
//! │  ┌──────────────────────────┼────────────────────────────────┐  │
//! │  │       axum HTTP Server (port 8080)                        │  │
//! │  │  GET /api/snapshot        → JSON state                    │  │
//! │  │  GET /api/feeds/{name}    → one feed                      │  │
//! │  │  PUT /api/period/{period} → switch 24h / YTD              │  │
//! │  │  GET /metrics             → Prometheus text               │  │
//! │  │  GET /ws                  → WebSocket upgrade             │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use mwlite_dashboard::{run_server, DashboardConfig, DashboardState};
//!
//! let (period_tx, _) = tokio::sync::watch::channel(Period::Recent);
//! let dashboard_state = DashboardState::new(feeds, period_tx);
//!
//! let token = CancellationToken::new();
//! tokio::spawn(run_server(dashboard_state, DashboardConfig::default(), token));
//! ```

mod broadcast;
mod config;
mod error;
mod server;
mod state;
mod types;

pub use broadcast::run_broadcaster;
pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use server::{create_router, run_server, serve, AppState, ConnectionGuard, ConnectionLimiter};
pub use state::{DashboardState, ERROR_BANNER_MESSAGE};
pub use types::{ApiError, DashboardMessage, DashboardSnapshot, ErrorBanner};
