//! WebSocket broadcast functionality.
//!
//! The broadcaster collects the dashboard state at a fixed interval and
//! broadcasts it to all connected WebSocket clients.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::state::DashboardState;
use crate::types::DashboardMessage;

/// Run the broadcaster task until `token` is cancelled.
pub async fn run_broadcaster(
    state: DashboardState,
    tx: broadcast::Sender<String>,
    interval_ms: u64,
    token: CancellationToken,
) {
    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    let mut last_period = state.period();

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = interval.tick() => {}
        }

        let period = state.period();
        if period != last_period {
            send(
                &tx,
                &DashboardMessage::PeriodChanged {
                    period,
                    period_label: period.label().to_string(),
                },
            );
            last_period = period;
        }

        let snapshot = state.collect_snapshot();
        send(
            &tx,
            &DashboardMessage::Update {
                timestamp_ms: snapshot.timestamp_ms,
                feeds: snapshot.feeds,
                overview: snapshot.overview,
                error_banner: snapshot.error_banner,
            },
        );
    }

    debug!("Broadcaster stopped");
}

fn send(tx: &broadcast::Sender<String>, msg: &DashboardMessage) {
    match serde_json::to_string(msg) {
        Ok(json) => match tx.send(json) {
            Ok(n) => trace!(receivers = n, "Broadcast update sent"),
            // No receivers - this is normal when no clients connected
            Err(_) => trace!("No WebSocket receivers connected"),
        },
        Err(e) => debug!(error = %e, "Failed to serialize dashboard update"),
    }
}
