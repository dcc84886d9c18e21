use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::AppState;

/// Body of the `/health` endpoint.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub live: bool,
    pub ready: bool,
    pub service: &'static str,
    pub uptime_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// # GET /health
///
/// Liveness is true once the process runs. Readiness additionally requires
/// the bootstrap gate to be open and a bounded round trip to succeed; both
/// checks recover on the next probe once connectivity returns. Degraded
/// states answer 503 with the same payload shape, never a crash or a hang.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthStatus>) {
    let (ready, detail) = if !state.is_ready() {
        (false, Some("bootstrap has not completed".to_string()))
    } else {
        match state.repo.ping().await {
            Ok(()) => (true, None),
            Err(error) => (false, Some(format!("database unreachable: {error}"))),
        }
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthStatus {
            live: true,
            ready,
            service: state.service.name(),
            uptime_secs: state.uptime_secs(),
            detail,
        }),
    )
}
