//! HTTP surface for health and operator status.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use relay_core::{clean_length, MonitorSnapshot};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/v1/status", get(status))
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    uptime_secs: u64,
    uses: u64,
    suspended: bool,
    resuming_in: String,
    monitor: MonitorSnapshot,
    loops: BTreeMap<String, u64>,
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let monitor = state.monitor().snapshot();

    Json(StatusResponse {
        uptime_secs: state.uptime().as_secs(),
        uses: state.uses(),
        suspended: monitor.suspended,
        resuming_in: clean_length(Duration::from_millis(monitor.resume_in_ms)),
        monitor,
        loops: state.loop_heartbeat_ages(),
    })
}

#[cfg(test)]
mod tests;
