//! Health and Kubernetes probe endpoints.
//!
//! - `/health` - detailed status including database connectivity
//! - `/livez` - liveness: the process is running
//! - `/readyz` - readiness: dependencies are reachable and the service is
//!   not draining for shutdown

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::time::Duration;

use crate::state::AppState;

/// Timeout for the database connectivity check.
const DB_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Check database connectivity with a bounded round-trip.
async fn database_healthy(state: &AppState) -> bool {
    let check = sqlx::query("SELECT 1").execute(&state.db);
    matches!(tokio::time::timeout(DB_CHECK_TIMEOUT, check).await, Ok(Ok(_)))
}

/// Detailed health report.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let database = if database_healthy(&state).await {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(json!({
        "status": if database == "healthy" { "healthy" } else { "degraded" },
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Liveness probe: always 200 while the process runs.
pub async fn livez_handler() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe: 503 while draining or when the database is unreachable,
/// so the orchestrator stops routing traffic here.
pub async fn readyz_handler(State(state): State<AppState>) -> StatusCode {
    if state.is_shutting_down() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    if database_healthy(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
