//! Handlers for the student routes, including the CSV bulk upload.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use shared::StudentInput;
use tracing::info;

use crate::io::rest::{error_response, AppState};

/// Axum handler for POST /api/v1/students
pub async fn create_student(
    State(state): State<AppState>,
    Json(input): Json<StudentInput>,
) -> impl IntoResponse {
    info!("POST /api/v1/students - studentId: {}", input.student_id);

    match state.student_service.create_student(input).await {
        Ok(student) => (StatusCode::CREATED, Json(student)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/v1/students
pub async fn list_students(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/v1/students");

    match state.student_service.list_students().await {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/v1/students/count
pub async fn count_students(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/v1/students/count");

    match state.student_service.count_students().await {
        Ok(count) => (StatusCode::OK, Json(count)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/v1/students/vaccinated-stats
pub async fn vaccinated_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/v1/students/vaccinated-stats");

    match state.student_service.vaccinated_stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/v1/students/:id
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/v1/students/{}", id);

    match state.student_service.get_student(&id).await {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for PUT /api/v1/students/:id
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<StudentInput>,
) -> impl IntoResponse {
    info!("PUT /api/v1/students/{}", id);

    match state.student_service.update_student(&id, input).await {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for DELETE /api/v1/students/:id
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/v1/students/{}", id);

    match state.student_service.delete_student(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for POST /api/v1/students/upload-csv. Expects a
/// multipart form with a `file` part holding the CSV.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    info!("POST /api/v1/students/upload-csv");

    let mut csv_text = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                if !looks_like_csv(field.content_type(), field.file_name()) {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "message": "Only CSV files are allowed" })),
                    )
                        .into_response();
                }
                match field.text().await {
                    Ok(text) => {
                        csv_text = Some(text);
                        break;
                    }
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "message": format!("Error reading upload: {e}") })),
                        )
                            .into_response();
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": format!("Error reading upload: {e}") })),
                )
                    .into_response();
            }
        }
    }

    let Some(csv_text) = csv_text else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "No file uploaded" })),
        )
            .into_response();
    };

    match state.import_service.import_students(&csv_text).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(e),
    }
}

/// A part counts as CSV if either its declared content type or its file
/// name says so
fn looks_like_csv(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    if content_type == Some("text/csv") {
        return true;
    }
    file_name
        .map(|name| name.to_lowercase().ends_with(".csv"))
        .unwrap_or(false)
}
