//! HTTP server implementation using axum.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, put};
use axum::Router;
use futures_util::stream::StreamExt;
use futures_util::SinkExt;
use mwlite_core::Period;
use mwlite_telemetry::Metrics;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::state::DashboardState;
use crate::types::{ApiError, DashboardMessage};

/// Broadcast buffer for slow clients, in messages.
const BROADCAST_CAPACITY: usize = 32;

/// Connection limiter to prevent too many concurrent WebSocket connections.
pub struct ConnectionLimiter {
    current: AtomicUsize,
    max: usize,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max,
        }
    }

    /// Take a slot; the slot is released when the guard drops.
    pub fn try_acquire(self: &Arc<Self>) -> Option<ConnectionGuard> {
        loop {
            let current = self.current.load(Ordering::Acquire);
            if current >= self.max {
                return None;
            }
            if self
                .current
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                Metrics::dashboard_client_connected();
                return Some(ConnectionGuard {
                    limiter: Arc::clone(self),
                });
            }
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}

/// Owned connection slot.
pub struct ConnectionGuard {
    limiter: Arc<ConnectionLimiter>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::Release);
        Metrics::dashboard_client_disconnected();
    }
}

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    dashboard_state: DashboardState,
    broadcast_tx: broadcast::Sender<String>,
    connection_limiter: Arc<ConnectionLimiter>,
}

impl AppState {
    pub fn new(
        dashboard_state: DashboardState,
        broadcast_tx: broadcast::Sender<String>,
        config: &DashboardConfig,
    ) -> Self {
        Self {
            dashboard_state,
            broadcast_tx,
            connection_limiter: Arc::new(ConnectionLimiter::new(config.max_connections)),
        }
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/snapshot", get(get_snapshot))
        .route("/api/feeds/{name}", get(get_feed))
        .route("/api/period", get(get_period))
        .route("/api/period/{period}", put(put_period))
        .route("/metrics", get(get_metrics))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiError::new(message))).into_response()
}

/// Get current state snapshot as JSON.
async fn get_snapshot(State(state): State<AppState>) -> Json<crate::types::DashboardSnapshot> {
    Json(state.dashboard_state.collect_snapshot())
}

/// Get one feed's summary.
async fn get_feed(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.dashboard_state.feed_summary(&name) {
        Some(summary) => Json(summary).into_response(),
        None => api_error(StatusCode::NOT_FOUND, format!("unknown feed '{name}'")),
    }
}

async fn get_period(State(state): State<AppState>) -> Response {
    let period = state.dashboard_state.period();
    Json(serde_json::json!({
        "period": period,
        "period_label": period.label(),
    }))
    .into_response()
}

/// Switch the global period.
async fn put_period(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let period = match Period::from_str(&raw) {
        Ok(period) => period,
        Err(e) => return api_error(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let changed = state.dashboard_state.set_period(period);
    Json(serde_json::json!({
        "period": period,
        "period_label": period.label(),
        "changed": changed,
    }))
    .into_response()
}

/// Prometheus text exposition.
async fn get_metrics() -> Response {
    match mwlite_telemetry::gather() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// WebSocket upgrade handler.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    // Check connection limit; the guard lives as long as the connection.
    let guard = match state.connection_limiter.try_acquire() {
        Some(guard) => guard,
        None => {
            warn!(
                current = state.connection_limiter.current_count(),
                "WebSocket connection limit reached"
            );
            return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
        }
    };

    info!(
        connections = state.connection_limiter.current_count(),
        "New WebSocket connection"
    );

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, guard))
}

/// Handle a WebSocket connection.
async fn handle_ws_connection(socket: WebSocket, state: AppState, _guard: ConnectionGuard) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the initial snapshot so no update is missed.
    let mut broadcast_rx = state.broadcast_tx.subscribe();

    let initial_msg = DashboardMessage::Snapshot(state.dashboard_state.collect_snapshot());
    if let Ok(json) = serde_json::to_string(&initial_msg) {
        if sender.send(Message::Text(json.into())).await.is_err() {
            debug!("Failed to send initial snapshot, client disconnected");
            return;
        }
    }

    // Incoming side only watches for close; pongs are automatic.
    let mut incoming_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Err(e) => {
                    debug!(error = %e, "WebSocket receive error");
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(msg) => {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            debug!("Failed to send message, client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "WebSocket client lagged, catching up");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }
            _ = &mut incoming_task => {
                debug!("Incoming task completed, closing connection");
                break;
            }
        }
    }

    incoming_task.abort();
    info!(
        connections = state.connection_limiter.current_count().saturating_sub(1),
        "WebSocket connection closed"
    );
}

/// Serve the dashboard on an already bound listener until `token` is
/// cancelled.
pub async fn serve(
    listener: TcpListener,
    dashboard_state: DashboardState,
    config: DashboardConfig,
    token: CancellationToken,
) -> DashboardResult<()> {
    let (broadcast_tx, _) = broadcast::channel::<String>(BROADCAST_CAPACITY);
    let app = create_router(AppState::new(
        dashboard_state.clone(),
        broadcast_tx.clone(),
        &config,
    ));

    let broadcaster = tokio::spawn(crate::broadcast::run_broadcaster(
        dashboard_state,
        broadcast_tx,
        config.update_interval_ms,
        token.clone(),
    ));

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(token.clone().cancelled_owned())
        .await;

    token.cancel();
    if let Err(e) = broadcaster.await {
        error!(error = %e, "Broadcaster task failed");
    }

    info!("Dashboard server stopped");
    result.map_err(DashboardError::from)
}

/// Bind `config.host:config.port` and run the dashboard HTTP server.
pub async fn run_server(
    dashboard_state: DashboardState,
    config: DashboardConfig,
    token: CancellationToken,
) -> DashboardResult<()> {
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| DashboardError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(addr = %addr, "Starting dashboard server");

    serve(listener, dashboard_state, config, token).await
}
