//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (built UI present)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::state::ServerState;

const BACKEND_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// healthy or degraded
    pub status: String,
    pub ui: String,
    pub backend: String,
    pub uptime_seconds: u64,
    pub version: String,
}

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// 503 until the UI build output contains `index.html`.
pub async fn readiness(State(state): State<Arc<ServerState>>) -> StatusCode {
    if ui_present(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    let ui_ok = ui_present(&state).await;
    let backend_ok = backend_reachable(&state).await;

    Json(HealthResponse {
        status: if ui_ok && backend_ok { "healthy" } else { "degraded" }.to_string(),
        ui: if ui_ok { "ok" } else { "missing" }.to_string(),
        backend: if backend_ok { "ok" } else { "unreachable" }.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn ui_present(state: &ServerState) -> bool {
    tokio::fs::metadata(state.static_dir().join("index.html"))
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Any HTTP answer counts; only connection failures do not
async fn backend_reachable(state: &ServerState) -> bool {
    match state
        .http
        .get(state.backend_url())
        .timeout(BACKEND_PROBE_TIMEOUT)
        .send()
        .await
    {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Backend probe failed: {}", e);
            false
        }
    }
}
