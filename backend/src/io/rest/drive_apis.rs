//! Handlers for the vaccination drive routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::DriveInput;
use tracing::info;

use crate::io::rest::{error_response, AppState};

/// Axum handler for POST /api/v1/vaccination-drives
pub async fn create_drive(
    State(state): State<AppState>,
    Json(input): Json<DriveInput>,
) -> impl IntoResponse {
    info!(
        "POST /api/v1/vaccination-drives - vaccine: {}",
        input.vaccine_name
    );

    match state.drive_service.create_drive(input).await {
        Ok(drive) => (StatusCode::CREATED, Json(drive)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/v1/vaccination-drives
pub async fn list_drives(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/v1/vaccination-drives");

    match state.drive_service.list_drives().await {
        Ok(drives) => (StatusCode::OK, Json(drives)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/v1/vaccination-drives/upcoming
pub async fn upcoming_drives(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/v1/vaccination-drives/upcoming");

    match state.drive_service.upcoming_drives().await {
        Ok(drives) => (StatusCode::OK, Json(drives)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/v1/vaccination-drives/:id
pub async fn get_drive(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("GET /api/v1/vaccination-drives/{}", id);

    match state.drive_service.get_drive(&id).await {
        Ok(drive) => (StatusCode::OK, Json(drive)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for PUT /api/v1/vaccination-drives/:id
pub async fn update_drive(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<DriveInput>,
) -> impl IntoResponse {
    info!("PUT /api/v1/vaccination-drives/{}", id);

    match state.drive_service.update_drive(&id, input).await {
        Ok(drive) => (StatusCode::OK, Json(drive)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for DELETE /api/v1/vaccination-drives/:id
pub async fn delete_drive(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/v1/vaccination-drives/{}", id);

    match state.drive_service.delete_drive(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dates;
    use crate::io::rest::test_support::setup_test_state;
    use chrono::Duration;

    fn input_in_days(days: i64) -> DriveInput {
        DriveInput {
            vaccine_name: "MMR".to_string(),
            date: dates::format_day(dates::today() + Duration::days(days)),
            available_doses: 100,
            applicable_classes: vec!["9B".to_string()],
            venue: None,
            organizer: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_drive_handler() {
        let state = setup_test_state().await;

        let created = create_drive(State(state.clone()), Json(input_in_days(20)))
            .await
            .into_response();
        assert_eq!(created.status(), StatusCode::CREATED);

        // Too soon: the scheduling window turns into a 400
        let too_soon = create_drive(State(state), Json(input_in_days(5)))
            .await
            .into_response();
        assert_eq!(too_soon.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_update_delete_drive_handlers() {
        let state = setup_test_state().await;
        let drive = state
            .drive_service
            .create_drive(input_in_days(20))
            .await
            .unwrap();

        let fetched = get_drive(State(state.clone()), Path(drive.id.clone()))
            .await
            .into_response();
        assert_eq!(fetched.status(), StatusCode::OK);

        let mut update = input_in_days(21);
        update.available_doses = 50;
        let updated = update_drive(State(state.clone()), Path(drive.id.clone()), Json(update))
            .await
            .into_response();
        assert_eq!(updated.status(), StatusCode::OK);

        let deleted = delete_drive(State(state.clone()), Path(drive.id.clone()))
            .await
            .into_response();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let gone = get_drive(State(state), Path(drive.id)).await.into_response();
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upcoming_drives_handler() {
        let state = setup_test_state().await;
        state
            .drive_service
            .create_drive(input_in_days(20))
            .await
            .unwrap();

        let response = upcoming_drives(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
