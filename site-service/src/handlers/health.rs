use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{dtos::MessageResponse, services::metrics, AppState};

const API_BANNER: &str = "MITA ICT API - Where Technology Meets Strategy";

/// Liveness: the process is up and serving.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": state.config.service_name,
    }))
}

/// Readiness: the store answers a ping.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.stores.health.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::error!(error = %e, "Store readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

pub async fn metrics_handler() -> impl IntoResponse {
    metrics::get_metrics()
}

pub async fn api_root() -> Json<MessageResponse> {
    Json(MessageResponse::new(API_BANNER))
}
