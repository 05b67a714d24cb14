//! Liveness endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use crate::state::AppState;

/// `200` when the store answers, `503` otherwise
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let backend = state.database.backend();
    match state.database.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok", "database": backend }))),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "database": backend })),
            )
        }
    }
}
