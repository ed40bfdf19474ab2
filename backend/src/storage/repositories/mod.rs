//! Per-entity repositories over the shared [`DbConnection`](super::DbConnection).

pub mod drive_repository;
pub mod record_repository;
pub mod student_repository;
pub mod user_repository;

pub use drive_repository::DriveRepository;
pub use record_repository::RecordRepository;
pub use student_repository::StudentRepository;
pub use user_repository::{UserRepository, UserRow};
