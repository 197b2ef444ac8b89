use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::auth::{Capability, Permissions};
use crate::backend::BackendError;
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::BearerToken;

/// GET /api/admin/users - List every auth user
///
/// The caller is resolved from the bearer token and must hold the
/// `ManageUsers` capability, the same rule the `/admin` route is guarded by.
///
/// Expected Output:
/// ```json
/// {
///   "users": [
///     {
///       "id": "user_uuid",
///       "email": "user@example.com",
///       "created_at": "2025-01-01T00:00:00Z",
///       "last_sign_in_at": "2025-01-01T12:00:00Z"
///     }
///   ]
/// }
/// ```
///
/// Errors: 401 missing or invalid token, 403 not an admin, 500 listing failed.
pub async fn list_users(State(state): State<AppState>, token: BearerToken) -> Result<Json<Value>, ApiError> {
    let caller = state.auth.get_user(token.as_str()).await.map_err(|e| match e {
        BackendError::Unauthorized(_) | BackendError::NotFound(_) => ApiError::unauthorized("Invalid or expired token"),
        BackendError::Http { status, .. } if (400..500).contains(&status) => {
            ApiError::unauthorized("Invalid or expired token")
        }
        other => {
            tracing::error!("Failed to resolve caller: {}", other);
            ApiError::internal_server_error("Failed to verify caller")
        }
    })?;

    let profile = state.profiles.get_by_id(caller.id).await.map_err(|e| {
        tracing::error!("Failed to load profile for {}: {}", caller.id, e);
        ApiError::internal_server_error("Failed to verify caller")
    })?;

    if !Permissions::for_profile(profile.as_ref()).allows(Capability::ManageUsers) {
        tracing::warn!("Non-admin {} requested the user list", caller.id);
        return Err(ApiError::forbidden("Admin access required"));
    }

    let users = state.admin.list_users().await.map_err(|e| {
        tracing::error!("Failed to list users: {}", e);
        ApiError::internal_server_error("Failed to list users")
    })?;

    tracing::info!("Admin {} listed {} users", caller.id, users.len());
    Ok(Json(json!({ "users": users })))
}

/// Any other method on an admin endpoint
pub async fn method_not_allowed(method: Method) -> Response {
    let mut response = ApiError::method_not_allowed(format!("Method {} not allowed", method)).into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET"));
    response
}
