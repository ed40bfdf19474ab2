use shared::{Student, StudentCountResponse, StudentInput, VaccinatedStatsResponse};
use tracing::{info, warn};

use crate::domain::dates;
use crate::domain::error::DomainError;
use crate::storage::{DbConnection, RecordRepository, StudentRepository};

/// Service for managing students
#[derive(Clone)]
pub struct StudentService {
    students: StudentRepository,
    records: RecordRepository,
}

impl StudentService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            students: StudentRepository::new(db.clone()),
            records: RecordRepository::new(db),
        }
    }

    /// Create a new student
    pub async fn create_student(&self, input: StudentInput) -> Result<Student, DomainError> {
        info!("Creating student: studentId={}", input.student_id);

        let input = validate_input(input)?;

        if self
            .students
            .find_by_student_id(&input.student_id)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(format!(
                "Student ID {} already in use",
                input.student_id
            )));
        }

        let student = build_student(Student::generate_id(), input);
        self.students.store_student(&student).await?;

        info!("Created student {} ({})", student.student_id, student.id);
        Ok(student)
    }

    /// Get a student by system id
    pub async fn get_student(&self, id: &str) -> Result<Student, DomainError> {
        self.students
            .get_student(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Student not found"))
    }

    /// List all students
    pub async fn list_students(&self) -> Result<Vec<Student>, DomainError> {
        Ok(self.students.list_students().await?)
    }

    /// Full-record update of an existing student
    pub async fn update_student(
        &self,
        id: &str,
        input: StudentInput,
    ) -> Result<Student, DomainError> {
        info!("Updating student: {}", id);

        let existing = self.get_student(id).await?;
        let input = validate_input(input)?;

        // The natural key may change, but not onto another student
        if let Some(other) = self.students.find_by_student_id(&input.student_id).await? {
            if other.id != existing.id {
                return Err(DomainError::conflict(format!(
                    "Student ID {} already in use",
                    input.student_id
                )));
            }
        }

        let student = build_student(existing.id, input);
        self.students.update_student(&student).await?;

        Ok(student)
    }

    /// Delete a student by system id. Vaccination records referencing
    /// the student are left in place; there is no cascade rule.
    pub async fn delete_student(&self, id: &str) -> Result<(), DomainError> {
        let student = self.get_student(id).await?;
        self.students.delete_student(&student.id).await?;

        info!("Deleted student {} ({})", student.student_id, student.id);
        Ok(())
    }

    /// Total number of students
    pub async fn count_students(&self) -> Result<StudentCountResponse, DomainError> {
        let count = self.students.count_students().await?;
        Ok(StudentCountResponse { count })
    }

    /// Vaccination coverage counted over records marked vaccinated.
    /// This counts records, not distinct students, and is intentionally
    /// a different metric from the record router's stats.
    pub async fn vaccinated_stats(&self) -> Result<VaccinatedStatsResponse, DomainError> {
        let total = self.students.count_students().await?;
        let vaccinated = self.records.count_vaccinated_records().await?;

        let percentage = if total > 0 {
            vaccinated as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Ok(VaccinatedStatsResponse {
            total,
            vaccinated,
            percentage: format!("{:.2}", percentage),
        })
    }
}

/// Validate a create/update payload, normalizing the date of birth to
/// the canonical day form
fn validate_input(mut input: StudentInput) -> Result<StudentInput, DomainError> {
    if input.name.trim().is_empty() {
        return Err(DomainError::validation("Name is required"));
    }
    if input.class.trim().is_empty() {
        return Err(DomainError::validation("Class is required"));
    }
    if input.student_id.trim().is_empty() {
        return Err(DomainError::validation("Student ID is required"));
    }

    if let Some(dob) = &input.date_of_birth {
        match dates::parse_day(dob) {
            Some(day) => input.date_of_birth = Some(dates::format_day(day)),
            None => {
                warn!("Rejecting student payload with unparseable dateOfBirth: {dob}");
                return Err(DomainError::validation(
                    "Invalid date format for Date of Birth",
                ));
            }
        }
    }

    input.name = input.name.trim().to_string();
    input.class = input.class.trim().to_string();
    input.student_id = input.student_id.trim().to_string();

    Ok(input)
}

fn build_student(id: String, input: StudentInput) -> Student {
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

    fn sample_input(student_id: &str) -> StudentInput {
        StudentInput {
            name: "Asha Rao".to_string(),
            class: "9B".to_string(),
            student_id: student_id.to_string(),
            guardian: Some("R. Rao".to_string()),
            date_of_birth: Some("2011-04-02".to_string()),
            gender: Some("F".to_string()),
            contact_number: None,
            address: None,
        }
    }

    async fn setup_test() -> StudentService {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        StudentService::new(db)
    }

    #[tokio::test]
    async fn test_create_student() {
        let service = setup_test().await;

        let student = service
            .create_student(sample_input("S-1001"))
            .await
            .expect("Failed to create student");

        assert_eq!(student.name, "Asha Rao");
        assert_eq!(student.student_id, "S-1001");
        assert!(student.id.starts_with("student::"));
    }

    #[tokio::test]
    async fn test_create_student_validation() {
        let service = setup_test().await;

        let mut missing_name = sample_input("S-1");
        missing_name.name = "  ".to_string();
        assert!(matches!(
            service.create_student(missing_name).await,
            Err(DomainError::Validation(_))
        ));

        let mut bad_dob = sample_input("S-2");
        bad_dob.date_of_birth = Some("02/04/2011".to_string());
        assert!(matches!(
            service.create_student(bad_dob).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_student_duplicate_student_id() {
        let service = setup_test().await;

        service
            .create_student(sample_input("S-1001"))
            .await
            .expect("First create should succeed");

        let result = service.create_student(sample_input("S-1001")).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_and_delete_student() {
        let service = setup_test().await;

        let student = service.create_student(sample_input("S-1")).await.unwrap();

        let fetched = service.get_student(&student.id).await.unwrap();
        assert_eq!(fetched, student);

        service.delete_student(&student.id).await.unwrap();
        assert!(matches!(
            service.get_student(&student.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_student(&student.id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_student_full_overwrite() {
        let service = setup_test().await;

        let student = service.create_student(sample_input("S-1")).await.unwrap();

        let mut update = sample_input("S-1");
        update.name = "Asha R. Rao".to_string();
        update.guardian = None;

        let updated = service.update_student(&student.id, update).await.unwrap();
        assert_eq!(updated.id, student.id);
        assert_eq!(updated.name, "Asha R. Rao");
        // Full-record semantics: omitted optional fields are cleared
        assert_eq!(updated.guardian, None);
    }

    #[tokio::test]
    async fn test_update_cannot_steal_student_id() {
        let service = setup_test().await;

        let _first = service.create_student(sample_input("S-1")).await.unwrap();
        let second = service.create_student(sample_input("S-2")).await.unwrap();

        let takeover = sample_input("S-1");
        let result = service.update_student(&second.id, takeover).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));

        // Re-saving under its own natural key is fine
        let keep = sample_input("S-2");
        assert!(service.update_student(&second.id, keep).await.is_ok());
    }

    #[tokio::test]
    async fn test_count_students() {
        let service = setup_test().await;

        assert_eq!(service.count_students().await.unwrap().count, 0);

        service.create_student(sample_input("S-1")).await.unwrap();
        service.create_student(sample_input("S-2")).await.unwrap();

        assert_eq!(service.count_students().await.unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_vaccinated_stats_empty_school() {
        let service = setup_test().await;

        let stats = service.vaccinated_stats().await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.vaccinated, 0);
        assert_eq!(stats.percentage, "0.00");
    }
}
