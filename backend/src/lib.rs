//! Backend for the school vaccination tracker.
//!
//! Layers, outermost first: the REST surface in [`io`], the business
//! rules in [`domain`], and SQLite persistence in [`storage`]. All
//! state is built once at startup and shared through [`AppState`].

use axum::{
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub mod domain;
pub mod io;
pub mod storage;

use domain::{AuthService, CsvImportService, DriveService, RecordService, StudentService};
use io::rest::{auth, drive_apis, record_apis, student_apis, user_apis};
use storage::DbConnection;

pub use io::rest::AppState;

/// Open the database, run the schema setup and wire up the services
pub async fn initialize_backend(database_url: &str, jwt_secret: &str) -> anyhow::Result<AppState> {
    info!("Setting up database: {}", database_url);
    let db = DbConnection::new(database_url).await?;

    Ok(AppState {
        student_service: StudentService::new(db.clone()),
        drive_service: DriveService::new(db.clone()),
        record_service: RecordService::new(db.clone()),
        import_service: CsvImportService::new(db.clone()),
        auth_service: AuthService::new(db, jwt_secret),
    })
}

/// Build the application router. Everything under /api/v1 except
/// registration and login sits behind the bearer-token middleware.
pub fn create_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            warn!("Unparseable CORS origin {cors_origin:?}, allowing any origin");
            cors.allow_origin(Any)
        }
    };

    let public_routes = Router::new()
        .route("/users/register", post(user_apis::register))
        .route("/users/login", post(user_apis::login));

    let protected_routes = Router::new()
        .route("/users/:user_id", get(user_apis::get_profile))
        .route(
            "/students",
            get(student_apis::list_students).post(student_apis::create_student),
        )
        .route("/students/count", get(student_apis::count_students))
        .route(
            "/students/vaccinated-stats",
            get(student_apis::vaccinated_stats),
        )
        .route("/students/upload-csv", post(student_apis::upload_csv))
        .route(
            "/students/:id",
            get(student_apis::get_student)
                .put(student_apis::update_student)
                .delete(student_apis::delete_student),
        )
        .route(
            "/vaccination-drives",
            get(drive_apis::list_drives).post(drive_apis::create_drive),
        )
        .route(
            "/vaccination-drives/upcoming",
            get(drive_apis::upcoming_drives),
        )
        .route(
            "/vaccination-drives/:id",
            get(drive_apis::get_drive)
                .put(drive_apis::update_drive)
                .delete(drive_apis::delete_drive),
        )
        .route(
            "/vaccination-records",
            get(record_apis::list_records).post(record_apis::create_record),
        )
        .route("/vaccination-records/stats", get(record_apis::record_stats))
        .route(
            "/vaccination-records/:id",
            get(record_apis::get_record)
                .put(record_apis::update_record)
                .delete(record_apis::delete_record),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/healthcheck", get(healthcheck))
        .nest("/api/v1", public_routes.merge(protected_routes))
        .layer(cors)
        .with_state(state)
}

/// Axum handler for GET /healthcheck
async fn healthcheck() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
