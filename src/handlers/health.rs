use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::info;

use crate::state::AppState;

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let registry = state.policy.classifier().registry();
    let metrics = state.gate.metrics();

    let mut allowed_types: Vec<&str> = state
        .admission
        .allowed_types
        .iter()
        .map(String::as_str)
        .collect();
    allowed_types.sort_unstable();

    let status = if registry.is_empty() { "degraded" } else { "healthy" };

    info!(status = status, "Health check completed");

    Json(json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "classifier": {
            "signatures": registry.len()
        },
        "admission": {
            "allowed_types": allowed_types,
            "max_size_kb": state.admission.max_size_kb
        },
        "rate_limiting": {
            "total_requests": metrics.total_requests,
            "rejected_requests": metrics.rejected_requests,
            "available_permits": metrics.available_permits,
            "rejection_rate": metrics.rejection_rate()
        }
    }))
}

/// Readiness check endpoint
pub async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    if state.policy.classifier().registry().is_empty() {
        info!("Readiness check failed - signature registry is empty");
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}
