//! REST API over the domain services.
//!
//! Handlers follow a single shape: log the request, call the service,
//! map the result. Domain errors carry their own user-facing message;
//! `error_response` picks the status code and wraps the message in the
//! `{"message": ...}` body every error shares.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domain::{
    AuthService, CsvImportService, DomainError, DriveService, RecordService, StudentService,
};

pub mod auth;
pub mod drive_apis;
pub mod record_apis;
pub mod student_apis;
pub mod user_apis;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub student_service: StudentService,
    pub drive_service: DriveService,
    pub record_service: RecordService,
    pub import_service: CsvImportService,
    pub auth_service: AuthService,
}

/// Map a domain error to its HTTP response. Internal errors are logged
/// in full and reported generically.
pub fn error_response(error: DomainError) -> Response {
    let status = match &error {
        DomainError::Validation(_) | DomainError::Conflict(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Internal(e) => {
            error!("Internal error handling request: {:?}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Server error" })),
            )
                .into_response();
        }
    };

    (status, Json(json!({ "message": error.to_string() }))).into_response()
}
