//! Handlers for user registration, login and profiles.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use shared::{LoginRequest, RegisterRequest};
use tracing::info;

use crate::domain::AuthUser;
use crate::io::rest::{error_response, AppState};

/// Axum handler for POST /api/v1/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> impl IntoResponse {
    info!("POST /api/v1/users/register - username: {}", request.username);

    match state.auth_service.register(request).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/v1/users/login");

    match state.auth_service.login(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/v1/users/:user_id
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/v1/users/{}", user_id);

    match state.auth_service.get_profile(&user_id, &identity).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => error_response(e),
    }
}
