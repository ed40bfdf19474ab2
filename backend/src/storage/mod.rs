//! # Storage Layer
//!
//! Persistence for the vaccination tracker: a shared SQLite connection
//! plus one repository per entity. The domain layer owns all business
//! rules; this layer is limited to SQL and row mapping.

pub mod db;
pub mod repositories;

pub use db::DbConnection;
pub use repositories::{
    DriveRepository, RecordRepository, StudentRepository, UserRepository, UserRow,
};
