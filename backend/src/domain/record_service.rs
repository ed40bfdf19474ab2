use shared::{RecordInput, RecordStatsResponse, VaccinationRecord, VaccinationRecordDetail};
use tracing::info;

use crate::domain::eligibility::EligibilityChecker;
use crate::domain::error::DomainError;
use crate::storage::{DbConnection, DriveRepository, RecordRepository, StudentRepository};

/// Service for managing vaccination records
#[derive(Clone)]
pub struct RecordService {
    records: RecordRepository,
    students: StudentRepository,
    drives: DriveRepository,
    eligibility: EligibilityChecker,
}

impl RecordService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            records: RecordRepository::new(db.clone()),
            students: StudentRepository::new(db.clone()),
            drives: DriveRepository::new(db.clone()),
            eligibility: EligibilityChecker::new(db),
        }
    }

    /// Create a record, enforcing that the student is not already
    /// covered for the drive's vaccine
    pub async fn create_record(
        &self,
        input: RecordInput,
    ) -> Result<VaccinationRecord, DomainError> {
        info!(
            "Creating record: student={}, drive={}",
            input.student_id, input.vaccination_drive_id
        );

        let drive = self
            .drives
            .get_drive(&input.vaccination_drive_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vaccination drive not found"))?;

        let student = self
            .students
            .get_student(&input.student_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Student not found"))?;

        self.eligibility
            .check_student_eligible(&student.id, &drive.vaccine_name)
            .await?;

        let record = build_record(VaccinationRecord::generate_id(), input);
        self.records.store_record(&record).await?;

        info!(
            "Created record {} ({} for {})",
            record.id, drive.vaccine_name, student.student_id
        );
        Ok(record)
    }

    /// Get a record by id with its references expanded
    pub async fn get_record(&self, id: &str) -> Result<VaccinationRecordDetail, DomainError> {
        let record = self
            .records
            .get_record(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vaccination record not found"))?;

        self.expand(record).await
    }

    /// List all records with their references expanded
    pub async fn list_records(&self) -> Result<Vec<VaccinationRecordDetail>, DomainError> {
        let records = self.records.list_records().await?;

        let mut details = Vec::with_capacity(records.len());
        for record in records {
            details.push(self.expand(record).await?);
        }
        Ok(details)
    }

    /// Full-record update of an existing record. Eligibility is a
    /// creation-time rule; updates follow last-writer-wins like every
    /// other write.
    pub async fn update_record(
        &self,
        id: &str,
        input: RecordInput,
    ) -> Result<VaccinationRecord, DomainError> {
        info!("Updating record: {}", id);

        let existing = self
            .records
            .get_record(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vaccination record not found"))?;

        let record = build_record(existing.id, input);
        self.records.update_record(&record).await?;

        Ok(record)
    }

    /// Delete a record by id
    pub async fn delete_record(&self, id: &str) -> Result<(), DomainError> {
        let record = self
            .records
            .get_record(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vaccination record not found"))?;

        self.records.delete_record(&record.id).await?;
        info!("Deleted record {}", record.id);
        Ok(())
    }

    /// Coverage counted over distinct vaccinated students
    pub async fn stats(&self) -> Result<RecordStatsResponse, DomainError> {
        let total_students = self.students.count_students().await?;
        let vaccinated_students = self.records.count_vaccinated_students().await?;

        let vaccination_percentage = if total_students > 0 {
            vaccinated_students as f64 / total_students as f64 * 100.0
        } else {
            0.0
        };

        Ok(RecordStatsResponse {
            total_students,
            vaccinated_students,
            vaccination_percentage,
        })
    }

    /// Resolve the student and drive references. Either may have been
    /// deleted since the record was written; the reference then stays
    /// null rather than failing the read.
    async fn expand(
        &self,
        record: VaccinationRecord,
    ) -> Result<VaccinationRecordDetail, DomainError> {
        let student = self.students.get_student(&record.student_id).await?;
        let drive = self.drives.get_drive(&record.vaccination_drive_id).await?;

        Ok(VaccinationRecordDetail {
            record,
            student,
            drive,
        })
    }
}

fn build_record(id: String, input: RecordInput) -> VaccinationRecord {
    VaccinationRecord {
        id,
        student_id: input.student_id,
        vaccination_drive_id: input.vaccination_drive_id,
        vaccinated: input.vaccinated,
        vaccination_date: input.vaccination_date,
        administered_by: input.administered_by,
        batch_number: input.batch_number,
        notes: input.notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dates;
    use crate::domain::drive_service::DriveService;
    use crate::domain::student_service::StudentService;
    use chrono::Duration;
    use shared::{DriveInput, StudentInput};

    struct Fixture {
        records: RecordService,
        students: StudentService,
        drives: DriveService,
    }

    async fn setup_test() -> Fixture {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        Fixture {
            records: RecordService::new(db.clone()),
            students: StudentService::new(db.clone()),
            drives: DriveService::new(db),
        }
    }

    async fn make_student(fixture: &Fixture, student_id: &str) -> shared::Student {
        fixture
            .students
            .create_student(StudentInput {
                name: "Asha Rao".to_string(),
                class: "9B".to_string(),
                student_id: student_id.to_string(),
                guardian: None,
                date_of_birth: None,
                gender: None,
                contact_number: None,
                address: None,
            })
            .await
            .expect("Failed to create student")
    }

    async fn make_drive(fixture: &Fixture, vaccine: &str, classes: &[&str]) -> shared::VaccinationDrive {
        fixture
            .drives
            .create_drive(DriveInput {
                vaccine_name: vaccine.to_string(),
                date: dates::format_day(dates::today() + Duration::days(20)),
                available_doses: 50,
                applicable_classes: classes.iter().map(|c| c.to_string()).collect(),
                venue: None,
                organizer: None,
                notes: None,
            })
            .await
            .expect("Failed to create drive")
    }

    fn record_input(student: &shared::Student, drive: &shared::VaccinationDrive) -> RecordInput {
        RecordInput {
            student_id: student.id.clone(),
            vaccination_drive_id: drive.id.clone(),
            vaccinated: true,
            vaccination_date: Some(drive.date.clone()),
            administered_by: Some("School nurse".to_string()),
            batch_number: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_record() {
        let fixture = setup_test().await;
        let student = make_student(&fixture, "S-1").await;
        let drive = make_drive(&fixture, "MMR", &["9B"]).await;

        let record = fixture
            .records
            .create_record(record_input(&student, &drive))
            .await
            .expect("Failed to create record");

        assert!(record.id.starts_with("record::"));
        assert!(record.vaccinated);
    }

    #[tokio::test]
    async fn test_create_record_unknown_references() {
        let fixture = setup_test().await;
        let student = make_student(&fixture, "S-1").await;
        let drive = make_drive(&fixture, "MMR", &["9B"]).await;

        let mut missing_drive = record_input(&student, &drive);
        missing_drive.vaccination_drive_id = "drive::missing".to_string();
        assert!(matches!(
            fixture.records.create_record(missing_drive).await,
            Err(DomainError::NotFound(_))
        ));

        let mut missing_student = record_input(&student, &drive);
        missing_student.student_id = "student::missing".to_string();
        assert!(matches!(
            fixture.records.create_record(missing_student).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_same_vaccine_is_rejected_across_drives() {
        let fixture = setup_test().await;
        let student = make_student(&fixture, "S-1").await;
        let drive_a = make_drive(&fixture, "MMR", &["9B"]).await;
        // Different day would be needed to avoid overlap; disjoint classes suffice
        let drive_b = make_drive(&fixture, "MMR", &["7D"]).await;

        fixture
            .records
            .create_record(record_input(&student, &drive_a))
            .await
            .unwrap();

        // Same vaccine via another drive: rejected
        let result = fixture
            .records
            .create_record(record_input(&student, &drive_b))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_different_vaccine_is_allowed() {
        let fixture = setup_test().await;
        let student = make_student(&fixture, "S-1").await;
        let mmr = make_drive(&fixture, "MMR", &["9B"]).await;
        let polio = make_drive(&fixture, "Polio", &["9B"]).await;

        fixture
            .records
            .create_record(record_input(&student, &mmr))
            .await
            .unwrap();

        assert!(fixture
            .records
            .create_record(record_input(&student, &polio))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_expanded_reads_resolve_references() {
        let fixture = setup_test().await;
        let student = make_student(&fixture, "S-1").await;
        let drive = make_drive(&fixture, "MMR", &["9B"]).await;

        let record = fixture
            .records
            .create_record(record_input(&student, &drive))
            .await
            .unwrap();

        let detail = fixture.records.get_record(&record.id).await.unwrap();
        assert_eq!(detail.student.as_ref().map(|s| s.id.as_str()), Some(student.id.as_str()));
        assert_eq!(detail.drive.as_ref().map(|d| d.id.as_str()), Some(drive.id.as_str()));
    }

    #[tokio::test]
    async fn test_expanded_reads_tolerate_deleted_student() {
        let fixture = setup_test().await;
        let student = make_student(&fixture, "S-1").await;
        let drive = make_drive(&fixture, "MMR", &["9B"]).await;

        let record = fixture
            .records
            .create_record(record_input(&student, &drive))
            .await
            .unwrap();

        // No cascade: the record survives the student
        fixture.students.delete_student(&student.id).await.unwrap();

        let detail = fixture.records.get_record(&record.id).await.unwrap();
        assert!(detail.student.is_none());
        assert!(detail.drive.is_some());
    }

    #[tokio::test]
    async fn test_stats_count_distinct_students() {
        let fixture = setup_test().await;
        let student = make_student(&fixture, "S-1").await;
        let _other = make_student(&fixture, "S-2").await;
        let mmr = make_drive(&fixture, "MMR", &["9B"]).await;
        let polio = make_drive(&fixture, "Polio", &["9B"]).await;

        // One student vaccinated twice
        fixture
            .records
            .create_record(record_input(&student, &mmr))
            .await
            .unwrap();
        fixture
            .records
            .create_record(record_input(&student, &polio))
            .await
            .unwrap();

        let stats = fixture.records.stats().await.unwrap();
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.vaccinated_students, 1);
        assert!((stats.vaccination_percentage - 50.0).abs() < f64::EPSILON);

        // The student-router metric counts records instead
        let record_metric = fixture.students.vaccinated_stats().await.unwrap();
        assert_eq!(record_metric.vaccinated, 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_record() {
        let fixture = setup_test().await;
        let student = make_student(&fixture, "S-1").await;
        let drive = make_drive(&fixture, "MMR", &["9B"]).await;

        let record = fixture
            .records
            .create_record(record_input(&student, &drive))
            .await
            .unwrap();

        let mut update = record_input(&student, &drive);
        update.vaccinated = false;
        update.vaccination_date = None;

        let updated = fixture.records.update_record(&record.id, update).await.unwrap();
        assert!(!updated.vaccinated);
        assert!(updated.vaccination_date.is_none());

        fixture.records.delete_record(&record.id).await.unwrap();
        assert!(matches!(
            fixture.records.get_record(&record.id).await,
            Err(DomainError::NotFound(_))
        ));
    }
}
