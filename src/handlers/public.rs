use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::{json, Value};

use super::AppState;
use crate::middleware::ApiResponse;

/// GET / - Service banner
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "Casedesk API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Immigration case management backend",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "admin": "/api/admin/users (admin bearer token)",
        }
    }))
}

/// GET /health - Backend reachability
///
/// Responds 200 when the hosted backend answers its health probe and 503
/// otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.admin.health().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "backend": "ok"
        })),
        Err(e) => {
            tracing::warn!("Health probe failed: {}", e);
            ApiResponse::with_status(
                json!({
                    "status": "degraded",
                    "timestamp": now,
                    "backend_error": e.to_string()
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            )
        }
    }
}
