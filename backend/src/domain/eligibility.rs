//! Eligibility and overlap checks for the two stateful operations.
//!
//! These are advisory boundary checks, not transactional guarantees:
//! no lock is held between a check and the following write, so two
//! concurrent requests can still race past them. The one hard
//! uniqueness rule in the system is the UNIQUE index on
//! `students.student_id`.

use chrono::{Duration, NaiveDate};

use crate::domain::dates;
use crate::domain::error::DomainError;
use crate::storage::{DbConnection, DriveRepository, RecordRepository};

/// Minimum lead time for scheduling a drive, in days
pub const MIN_SCHEDULING_LEAD_DAYS: i64 = 15;

/// Decides whether a proposed drive or vaccination record conflicts
/// with existing state. Operates on plain data plus a store handle;
/// deliberately not attached to any entity type.
#[derive(Clone)]
pub struct EligibilityChecker {
    drives: DriveRepository,
    records: RecordRepository,
}

impl EligibilityChecker {
    pub fn new(db: DbConnection) -> Self {
        Self {
            drives: DriveRepository::new(db.clone()),
            records: RecordRepository::new(db),
        }
    }

    /// Check that a proposed drive may be scheduled: the date must be
    /// at least 15 days out, and no other drive for the same vaccine
    /// on the same calendar day may share an applicable class.
    ///
    /// `exclude_drive_id` removes the drive being updated from the
    /// overlap scan so a drive never conflicts with itself.
    pub async fn check_drive_schedulable(
        &self,
        vaccine_name: &str,
        date: NaiveDate,
        applicable_classes: &[String],
        exclude_drive_id: Option<&str>,
    ) -> Result<(), DomainError> {
        let min_date = dates::today() + Duration::days(MIN_SCHEDULING_LEAD_DAYS);
        if date < min_date {
            return Err(DomainError::validation(
                "Vaccination drive must be scheduled at least 15 days in advance",
            ));
        }

        let same_day = self
            .drives
            .find_by_vaccine_and_day(vaccine_name, &dates::format_day(date))
            .await?;

        let overlapping = same_day
            .iter()
            .filter(|existing| exclude_drive_id != Some(existing.id.as_str()))
            .any(|existing| classes_intersect(&existing.applicable_classes, applicable_classes));

        if overlapping {
            return Err(DomainError::conflict(format!(
                "A drive for {} on {} already covers one of the requested classes",
                vaccine_name,
                dates::format_day(date)
            )));
        }

        Ok(())
    }

    /// Check that a student may be enrolled for a vaccine. Name-keyed:
    /// any existing record whose drive carries the same vaccine name
    /// blocks enrollment, regardless of which drive it came from.
    pub async fn check_student_eligible(
        &self,
        student_system_id: &str,
        vaccine_name: &str,
    ) -> Result<(), DomainError> {
        if self
            .records
            .student_has_vaccine(student_system_id, vaccine_name)
            .await?
        {
            return Err(DomainError::conflict(
                "Student already vaccinated with this vaccine",
            ));
        }

        Ok(())
    }
}

/// Exact string comparison on class labels, no fuzzy matching
fn classes_intersect(a: &[String], b: &[String]) -> bool {
    a.iter().any(|class| b.contains(class))
}
