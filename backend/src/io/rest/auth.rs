//! Bearer-token middleware guarding the protected routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::io::rest::AppState;

/// Reject the request unless it carries a valid bearer token. On
/// success the verified identity is attached as a request extension for
/// downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Access denied. No token provided." })),
        )
            .into_response();
    };

    match state.auth_service.verify_token(&token) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => super::error_response(e),
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
