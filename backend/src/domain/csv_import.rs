//! Bulk CSV import of students.
//!
//! Best-effort batch semantics: each row is validated and upserted
//! independently, keyed by the `studentId` natural key, and one row's
//! failure never blocks or rolls back the others. The caller gets the
//! counts plus the per-row failure reasons.

use std::collections::HashMap;

use shared::{CsvImportResponse, Student, StudentInput};
use tracing::info;

use crate::domain::dates;
use crate::domain::error::DomainError;
use crate::storage::{DbConnection, StudentRepository};

/// The recognized CSV columns. Header names are matched after trimming,
/// lowercasing and stripping inner whitespace; unrecognized columns are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Name,
    Class,
    StudentId,
    Guardian,
    DateOfBirth,
    Gender,
    ContactNumber,
    Address,
}

fn recognize_header(header: &str) -> Option<Column> {
    let normalized: String = header.trim().to_lowercase().split_whitespace().collect();

    match normalized.as_str() {
        "name" => Some(Column::Name),
        "class" => Some(Column::Class),
        "studentid" | "student_id" => Some(Column::StudentId),
        "guardian" => Some(Column::Guardian),
        "dateofbirth" => Some(Column::DateOfBirth),
        "gender" => Some(Column::Gender),
        "contactnumber" | "contact_number" => Some(Column::ContactNumber),
        "address" => Some(Column::Address),
        _ => None,
    }
}

/// Service reconciling an uploaded CSV batch against the student store
#[derive(Clone)]
pub struct CsvImportService {
    students: StudentRepository,
}

impl CsvImportService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            students: StudentRepository::new(db),
        }
    }

    /// Import a CSV batch. Returns the per-batch summary; only an
    /// unreadable header fails the call as a whole.
    pub async fn import_students(
        &self,
        csv_text: &str,
    ) -> Result<CsvImportResponse, DomainError> {
        let rows = parse_rows(csv_text)?;
        let attempted = rows.len();

        let mut succeeded = 0usize;
        let mut failed_entries = Vec::new();

        for row in rows {
            match row.parsed {
                Ok(input) => match self.upsert(&input).await {
                    Ok(()) => succeeded += 1,
                    Err(e) => failed_entries.push(format!("Row {}: {}", row.line, e)),
                },
                Err(reason) => failed_entries.push(reason),
            }
        }

        info!(
            "CSV import: attempted={}, succeeded={}, failed={}",
            attempted,
            succeeded,
            failed_entries.len()
        );

        Ok(CsvImportResponse {
            success: true,
            message: format!(
                "Processed {} rows. Added/Updated: {}, Failed: {}",
                attempted,
                succeeded,
                failed_entries.len()
            ),
            failed_entries,
        })
    }

    /// Upsert keyed by the studentId natural key: overwrite the
    /// existing student's fields, or create a fresh one
    async fn upsert(&self, input: &StudentInput) -> anyhow::Result<()> {
        match self.students.find_by_student_id(&input.student_id).await? {
            Some(existing) => {
                let student = student_from_input(existing.id, input.clone());
                self.students.update_student(&student).await
            }
            None => {
                let student = student_from_input(Student::generate_id(), input.clone());
                self.students.store_student(&student).await
            }
        }
    }
}

struct ParsedRow {
    line: usize,
    parsed: Result<StudentInput, String>,
}

fn parse_rows(csv_text: &str) -> Result<Vec<ParsedRow>, DomainError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DomainError::validation(format!("Error parsing CSV file: {e}")))?
        .clone();

    // First match wins when synonym columns collide
    let mut columns: HashMap<Column, usize> = HashMap::new();
    for (index, header) in headers.iter().enumerate() {
        if let Some(column) = recognize_header(header) {
            columns.entry(column).or_insert(index);
        }
    }

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let line = i + 2; // line 1 is the header
        let parsed = match result {
            Ok(record) => row_to_input(&columns, &record, line),
            Err(e) => Err(format!("Row {line}: unreadable row: {e}")),
        };
        rows.push(ParsedRow { line, parsed });
    }

    Ok(rows)
}

fn row_to_input(
    columns: &HashMap<Column, usize>,
    record: &csv::StringRecord,
    line: usize,
) -> Result<StudentInput, String> {
    let value = |column: Column| -> Option<String> {
        columns
            .get(&column)
            .and_then(|&index| record.get(index))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    };

    let mut errors = Vec::new();

    let name = value(Column::Name);
    if name.is_none() {
        errors.push("Name is required");
    }
    let class = value(Column::Class);
    if class.is_none() {
        errors.push("Class is required");
    }
    let student_id = value(Column::StudentId);
    if student_id.is_none() {
        errors.push("Student ID is required");
    }

    let date_of_birth = match value(Column::DateOfBirth) {
        Some(raw) => match dates::parse_day(&raw) {
            Some(day) => Some(dates::format_day(day)),
            None => {
                errors.push("Invalid date format for Date of Birth");
                None
            }
        },
        None => None,
    };

    if !errors.is_empty() {
        return Err(format!("Row {line}: {}", errors.join(", ")));
    }

    Ok(StudentInput {
        name: name.unwrap_or_default(),
        class: class.unwrap_or_default(),
        student_id: student_id.unwrap_or_default(),
        guardian: value(Column::Guardian),
        date_of_birth,
        gender: value(Column::Gender),
        contact_number: value(Column::ContactNumber),
        address: value(Column::Address),
    })
}

fn student_from_input(id: String, input: StudentInput) -> Student {
    Student {
        id,
        name: input.name,
        class: input.class,
        student_id: input.student_id,
        guardian: input.guardian,
        date_of_birth: input.date_of_birth,
        gender: input.gender,
        contact_number: input.contact_number,
        address: input.address,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        import: CsvImportService,
        students: StudentRepository,
    }

    async fn setup_test() -> Fixture {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        Fixture {
            import: CsvImportService::new(db.clone()),
            students: StudentRepository::new(db),
        }
    }

    #[tokio::test]
    async fn test_import_valid_batch() {
        let fixture = setup_test().await;

        let csv = "name,class,studentId,guardian\n\
                   Asha Rao,9B,S-1,R. Rao\n\
                   Vikram Iyer,10A,S-2,\n";

        let summary = fixture.import.import_students(csv).await.unwrap();
        assert!(summary.success);
        assert!(summary.failed_entries.is_empty());
        assert_eq!(summary.message, "Processed 2 rows. Added/Updated: 2, Failed: 0");

        assert_eq!(fixture.students.count_students().await.unwrap(), 2);

        let asha = fixture
            .students
            .find_by_student_id("S-1")
            .await
            .unwrap()
            .expect("S-1 should exist");
        assert_eq!(asha.guardian.as_deref(), Some("R. Rao"));

        let vikram = fixture
            .students
            .find_by_student_id("S-2")
            .await
            .unwrap()
            .expect("S-2 should exist");
        assert_eq!(vikram.guardian, None);
    }

    #[tokio::test]
    async fn test_invalid_rows_fail_without_blocking_the_batch() {
        let fixture = setup_test().await;

        // Row 3 misses the name, row 5 has an unparseable birth date
        let csv = "name,class,studentId,dateOfBirth\n\
                   Asha Rao,9B,S-1,2011-04-02\n\
                   ,9B,S-2,2011-05-03\n\
                   Vikram Iyer,10A,S-3,\n\
                   Meera Nair,8C,S-4,not-a-date\n";

        let summary = fixture.import.import_students(csv).await.unwrap();
        assert_eq!(summary.failed_entries.len(), 2);
        assert!(summary.failed_entries[0].contains("Name is required"));
        assert!(summary.failed_entries[1].contains("Invalid date format"));

        // Exactly N - K students exist afterwards
        assert_eq!(fixture.students.count_students().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent_by_student_id() {
        let fixture = setup_test().await;

        let csv = "name,class,studentId\n\
                   Asha Rao,9B,S-1\n\
                   Vikram Iyer,10A,S-2\n";

        fixture.import.import_students(csv).await.unwrap();
        fixture.import.import_students(csv).await.unwrap();

        assert_eq!(fixture.students.count_students().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reimport_overwrites_by_natural_key() {
        let fixture = setup_test().await;

        fixture
            .import
            .import_students("name,class,studentId\nAsha Rao,9B,S-1\n")
            .await
            .unwrap();
        let before = fixture
            .students
            .find_by_student_id("S-1")
            .await
            .unwrap()
            .unwrap();

        fixture
            .import
            .import_students("name,class,studentId\nAsha Rao,10A,S-1\n")
            .await
            .unwrap();
        let after = fixture
            .students
            .find_by_student_id("S-1")
            .await
            .unwrap()
            .unwrap();

        // Same student, overwritten fields
        assert_eq!(after.id, before.id);
        assert_eq!(after.class, "10A");
        assert_eq!(fixture.students.count_students().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_header_synonyms_and_unknown_columns() {
        let fixture = setup_test().await;

        // "Student ID" normalizes to studentid, "contact_number" is the
        // underscore synonym; "house" is not a recognized column
        let csv = "Name,Class,Student ID,contact_number,house\n\
                   Asha Rao,9B,S-1,555-0100,Blue\n";

        let summary = fixture.import.import_students(csv).await.unwrap();
        assert!(summary.failed_entries.is_empty());

        let student = fixture
            .students
            .find_by_student_id("S-1")
            .await
            .unwrap()
            .expect("S-1 should exist");
        assert_eq!(student.contact_number.as_deref(), Some("555-0100"));
        assert_eq!(student.address, None);
    }

    #[tokio::test]
    async fn test_first_header_match_wins_on_synonym_collision() {
        let fixture = setup_test().await;

        let csv = "name,class,studentid,student_id\n\
                   Asha Rao,9B,S-FIRST,S-SECOND\n";

        fixture.import.import_students(csv).await.unwrap();

        assert!(fixture
            .students
            .find_by_student_id("S-FIRST")
            .await
            .unwrap()
            .is_some());
        assert!(fixture
            .students
            .find_by_student_id("S-SECOND")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_rfc3339_birth_dates_are_normalized() {
        let fixture = setup_test().await;

        let csv = "name,class,studentId,dateOfBirth\n\
                   Asha Rao,9B,S-1,2011-04-02T00:00:00+05:30\n";

        fixture.import.import_students(csv).await.unwrap();

        let student = fixture
            .students
            .find_by_student_id("S-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(student.date_of_birth.as_deref(), Some("2011-04-02"));
    }

    #[tokio::test]
    async fn test_header_only_file_imports_nothing() {
        let fixture = setup_test().await;

        let summary = fixture
            .import
            .import_students("name,class,studentId\n")
            .await
            .unwrap();

        assert_eq!(summary.message, "Processed 0 rows. Added/Updated: 0, Failed: 0");
        assert_eq!(fixture.students.count_students().await.unwrap(), 0);
    }
}
