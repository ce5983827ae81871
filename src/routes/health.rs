//! Health check endpoint
//!
//! Liveness probe for load balancers and orchestrators: pings the database
//! with a short fixed timeout and reports connection-pool statistics.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use std::time::Duration;

use crate::server::AppState;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, state.db.health_check()).await {
        Ok(Ok(())) => {
            let stats = state.db.stats();
            (
                StatusCode::OK,
                Json(json!({ "status": "up", "pool": stats })),
            )
        }
        Ok(Err(e)) => {
            tracing::error!("health check failed: {:#}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "down", "error": "database unreachable" })),
            )
        }
        Err(_) => {
            tracing::error!("health check timed out after {:?}", HEALTH_CHECK_TIMEOUT);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "down", "error": "health check timed out" })),
            )
        }
    }
}
