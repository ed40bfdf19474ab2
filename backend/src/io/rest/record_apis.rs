//! Handlers for the vaccination record routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::RecordInput;
use tracing::info;

use crate::io::rest::{error_response, AppState};

/// Axum handler for POST /api/v1/vaccination-records
pub async fn create_record(
    State(state): State<AppState>,
    Json(input): Json<RecordInput>,
) -> impl IntoResponse {
    info!(
        "POST /api/v1/vaccination-records - student: {}",
        input.student_id
    );

    match state.record_service.create_record(input).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/v1/vaccination-records
pub async fn list_records(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/v1/vaccination-records");

    match state.record_service.list_records().await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/v1/vaccination-records/stats
pub async fn record_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/v1/vaccination-records/stats");

    match state.record_service.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/v1/vaccination-records/:id
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/v1/vaccination-records/{}", id);

    match state.record_service.get_record(&id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for PUT /api/v1/vaccination-records/:id
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<RecordInput>,
) -> impl IntoResponse {
    info!("PUT /api/v1/vaccination-records/{}", id);

    match state.record_service.update_record(&id, input).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for DELETE /api/v1/vaccination-records/:id
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/v1/vaccination-records/{}", id);

    match state.record_service.delete_record(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
