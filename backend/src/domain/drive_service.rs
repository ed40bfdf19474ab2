use chrono::Duration;
use shared::{DriveInput, VaccinationDrive};
use tracing::info;

use crate::domain::dates;
use crate::domain::eligibility::EligibilityChecker;
use crate::domain::error::DomainError;
use crate::storage::{DbConnection, DriveRepository};

/// How far ahead the upcoming-drives listing looks, in days
const UPCOMING_WINDOW_DAYS: i64 = 30;

/// Service for managing vaccination drives
#[derive(Clone)]
pub struct DriveService {
    drives: DriveRepository,
    eligibility: EligibilityChecker,
}

impl DriveService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            drives: DriveRepository::new(db.clone()),
            eligibility: EligibilityChecker::new(db),
        }
    }

    /// Create a new drive, enforcing the 15-day scheduling window and
    /// the no-overlap rule
    pub async fn create_drive(&self, input: DriveInput) -> Result<VaccinationDrive, DomainError> {
        info!(
            "Creating drive: vaccine={}, date={}",
            input.vaccine_name, input.date
        );

        let (input, day) = validate_input(input)?;

        self.eligibility
            .check_drive_schedulable(&input.vaccine_name, day, &input.applicable_classes, None)
            .await?;

        let drive = build_drive(VaccinationDrive::generate_id(), input);
        self.drives.store_drive(&drive).await?;

        info!("Created drive {} for {}", drive.id, drive.vaccine_name);
        Ok(drive)
    }

    /// Get a drive by id
    pub async fn get_drive(&self, id: &str) -> Result<VaccinationDrive, DomainError> {
        self.drives
            .get_drive(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vaccination drive not found"))
    }

    /// List all drives
    pub async fn list_drives(&self) -> Result<Vec<VaccinationDrive>, DomainError> {
        Ok(self.drives.list_drives().await?)
    }

    /// Drives scheduled within the next 30 days, ascending by date
    pub async fn upcoming_drives(&self) -> Result<Vec<VaccinationDrive>, DomainError> {
        let today = dates::today();
        let horizon = today + Duration::days(UPCOMING_WINDOW_DAYS);

        Ok(self
            .drives
            .list_between(&dates::format_day(today), &dates::format_day(horizon))
            .await?)
    }

    /// Full-record update, re-running the scheduling checks with the
    /// drive itself excluded from the overlap scan
    pub async fn update_drive(
        &self,
        id: &str,
        input: DriveInput,
    ) -> Result<VaccinationDrive, DomainError> {
        info!("Updating drive: {}", id);

        let existing = self.get_drive(id).await?;
        let (input, day) = validate_input(input)?;

        self.eligibility
            .check_drive_schedulable(
                &input.vaccine_name,
                day,
                &input.applicable_classes,
                Some(&existing.id),
            )
            .await?;

        let drive = build_drive(existing.id, input);
        self.drives.update_drive(&drive).await?;

        Ok(drive)
    }

    /// Delete a drive by id
    pub async fn delete_drive(&self, id: &str) -> Result<(), DomainError> {
        let drive = self.get_drive(id).await?;
        self.drives.delete_drive(&drive.id).await?;

        info!("Deleted drive {} ({})", drive.vaccine_name, drive.id);
        Ok(())
    }
}

/// Validate a create/update payload and normalize its date to the
/// canonical day form
fn validate_input(mut input: DriveInput) -> Result<(DriveInput, chrono::NaiveDate), DomainError> {
    if input.vaccine_name.trim().is_empty() {
        return Err(DomainError::validation("Vaccine name is required"));
    }
    if input.available_doses < 1 {
        return Err(DomainError::validation(
            "Available doses must be a positive integer",
        ));
    }

    let day = dates::parse_day(&input.date)
        .ok_or_else(|| DomainError::validation("Date must be a valid ISO 8601 date"))?;

    input.vaccine_name = input.vaccine_name.trim().to_string();
    input.date = dates::format_day(day);

    Ok((input, day))
}

fn build_drive(id: String, input: DriveInput) -> VaccinationDrive {
    VaccinationDrive {
        id,
        vaccine_name: input.vaccine_name,
        date: input.date,
        available_doses: input.available_doses,
        applicable_classes: input.applicable_classes,
        venue: input.venue,
        organizer: input.organizer,
        notes: input.notes,
    }
}
