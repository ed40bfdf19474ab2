//! Shared data types for the vaccination tracker.
//!
//! Everything that crosses the HTTP boundary lives here so that the
//! backend and any future dashboard agree on the wire format. Fields
//! serialize as camelCase to match the public API.

use serde::{Deserialize, Serialize};

/// A student enrolled at the school.
///
/// `id` is the system identifier; `student_id` is the human-readable
/// natural key (unique across the school) used for CSV reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class: String,
    pub student_id: String,
    pub guardian: Option<String>,
    /// ISO 8601 date (YYYY-MM-DD)
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

impl Student {
    /// Generate a new system identifier for a student
    pub fn generate_id() -> String {
        format!("student::{}", uuid::Uuid::new_v4())
    }
}

/// Payload for creating or fully updating a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    pub name: String,
    pub class: String,
    pub student_id: String,
    #[serde(default)]
    pub guardian: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// A scheduled vaccination event for specific classes on a specific day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationDrive {
    pub id: String,
    pub vaccine_name: String,
    /// ISO 8601 date (YYYY-MM-DD); drives are day-granular
    pub date: String,
    pub available_doses: i64,
    pub applicable_classes: Vec<String>,
    pub venue: Option<String>,
    pub organizer: Option<String>,
    pub notes: Option<String>,
}

impl VaccinationDrive {
    /// Generate a new system identifier for a drive
    pub fn generate_id() -> String {
        format!("drive::{}", uuid::Uuid::new_v4())
    }
}

/// Payload for creating or fully updating a vaccination drive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveInput {
    pub vaccine_name: String,
    pub date: String,
    pub available_doses: i64,
    pub applicable_classes: Vec<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The join entity linking one student to one drive with the
/// vaccination outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationRecord {
    pub id: String,
    /// System id of the student (not the human-readable studentId)
    pub student_id: String,
    pub vaccination_drive_id: String,
    pub vaccinated: bool,
    pub vaccination_date: Option<String>,
    pub administered_by: Option<String>,
    pub batch_number: Option<String>,
    pub notes: Option<String>,
}

impl VaccinationRecord {
    /// Generate a new system identifier for a record
    pub fn generate_id() -> String {
        format!("record::{}", uuid::Uuid::new_v4())
    }
}

/// Payload for creating or fully updating a vaccination record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub student_id: String,
    pub vaccination_drive_id: String,
    #[serde(default)]
    pub vaccinated: bool,
    #[serde(default)]
    pub vaccination_date: Option<String>,
    #[serde(default)]
    pub administered_by: Option<String>,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A vaccination record with its student and drive references expanded.
///
/// Either reference may be null if the target entity has been deleted
/// since the record was written; records are never cascaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationRecordDetail {
    #[serde(flatten)]
    pub record: VaccinationRecord,
    pub student: Option<Student>,
    pub drive: Option<VaccinationDrive>,
}

/// A dashboard user, as serialized back to callers. The password hash
/// never leaves the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Generate a new system identifier for a user
    pub fn generate_id() -> String {
        format!("user::{}", uuid::Uuid::new_v4())
    }
}

/// Registration payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response: a bearer token plus the identity it embeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
}

/// Response for GET /students/count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentCountResponse {
    pub count: i64,
}

/// Response for GET /students/vaccinated-stats.
///
/// `vaccinated` counts vaccination *records* marked vaccinated, so a
/// student vaccinated twice counts twice. This is a different metric
/// from [`RecordStatsResponse`], which counts distinct students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccinatedStatsResponse {
    pub total: i64,
    pub vaccinated: i64,
    /// Percentage rendered with two decimals, e.g. "66.67"
    pub percentage: String,
}

/// Response for GET /vaccination-records/stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStatsResponse {
    pub total_students: i64,
    pub vaccinated_students: i64,
    pub vaccination_percentage: f64,
}

/// Summary of a CSV bulk import: best-effort batch semantics, so the
/// failures are reported per row rather than failing the upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvImportResponse {
    pub success: bool,
    pub message: String,
    pub failed_entries: Vec<String>,
}
