//! # Domain Layer
//!
//! Business logic for the vaccination tracker: one service per entity,
//! the eligibility checker for the two stateful operations (drive
//! scheduling, record creation), the CSV bulk-import reconciler, and
//! the auth gate. Services hold a `DbConnection` handle passed in at
//! startup; there is no ambient global state.

pub mod auth_service;
pub mod csv_import;
pub mod dates;
pub mod drive_service;
pub mod eligibility;
pub mod error;
pub mod record_service;
pub mod student_service;

pub use auth_service::{AuthService, AuthUser};
pub use csv_import::CsvImportService;
pub use drive_service::DriveService;
pub use eligibility::EligibilityChecker;
pub use error::DomainError;
pub use record_service::RecordService;
pub use student_service::StudentService;
