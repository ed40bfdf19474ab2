use anyhow::Result;
use shared::VaccinationDrive;
use sqlx::Row;
use tracing::warn;

use crate::storage::db::DbConnection;

/// Repository for vaccination drive operations.
///
/// Drive dates are stored canonically as `YYYY-MM-DD`, so day-granular
/// comparisons are plain string equality and range scans are
/// lexicographic.
#[derive(Clone)]
pub struct DriveRepository {
    db: DbConnection,
}

impl DriveRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a drive in the database
    pub async fn store_drive(&self, drive: &VaccinationDrive) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vaccination_drives
                (id, vaccine_name, date, available_doses, applicable_classes, venue, organizer, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&drive.id)
        .bind(&drive.vaccine_name)
        .bind(&drive.date)
        .bind(drive.available_doses)
        .bind(serde_json::to_string(&drive.applicable_classes)?)
        .bind(&drive.venue)
        .bind(&drive.organizer)
        .bind(&drive.notes)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Get a drive by id
    pub async fn get_drive(&self, id: &str) -> Result<Option<VaccinationDrive>> {
        let row = sqlx::query(
            r#"
            SELECT id, vaccine_name, date, available_doses, applicable_classes, venue, organizer, notes
            FROM vaccination_drives
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_drive))
    }

    /// List all drives ordered by date
    pub async fn list_drives(&self) -> Result<Vec<VaccinationDrive>> {
        let rows = sqlx::query(
            r#"
            SELECT id, vaccine_name, date, available_doses, applicable_classes, venue, organizer, notes
            FROM vaccination_drives
            ORDER BY date ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_drive).collect())
    }

    /// Find drives for the same vaccine on the same calendar day.
    /// Class intersection is decided by the eligibility checker.
    pub async fn find_by_vaccine_and_day(
        &self,
        vaccine_name: &str,
        day: &str,
    ) -> Result<Vec<VaccinationDrive>> {
        let rows = sqlx::query(
            r#"
            SELECT id, vaccine_name, date, available_doses, applicable_classes, venue, organizer, notes
            FROM vaccination_drives
            WHERE vaccine_name = ? AND date = ?
            "#,
        )
        .bind(vaccine_name)
        .bind(day)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_drive).collect())
    }

    /// List drives with a date inside [start, end], ascending by date
    pub async fn list_between(&self, start: &str, end: &str) -> Result<Vec<VaccinationDrive>> {
        let rows = sqlx::query(
            r#"
            SELECT id, vaccine_name, date, available_doses, applicable_classes, venue, organizer, notes
            FROM vaccination_drives
            WHERE date >= ? AND date <= ?
            ORDER BY date ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_drive).collect())
    }

    /// Overwrite a drive's fields (full-record update)
    pub async fn update_drive(&self, drive: &VaccinationDrive) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE vaccination_drives
            SET vaccine_name = ?, date = ?, available_doses = ?, applicable_classes = ?,
                venue = ?, organizer = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&drive.vaccine_name)
        .bind(&drive.date)
        .bind(drive.available_doses)
        .bind(serde_json::to_string(&drive.applicable_classes)?)
        .bind(&drive.venue)
        .bind(&drive.organizer)
        .bind(&drive.notes)
        .bind(&drive.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a drive by id
    pub async fn delete_drive(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM vaccination_drives WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    fn row_to_drive(row: &sqlx::sqlite::SqliteRow) -> VaccinationDrive {
        let classes_json: String = row.get("applicable_classes");
        let applicable_classes = serde_json::from_str(&classes_json).unwrap_or_else(|e| {
            warn!("Unreadable applicable_classes column, treating as empty: {e}");
            Vec::new()
        });

        VaccinationDrive {
            id: row.get("id"),
            vaccine_name: row.get("vaccine_name"),
            date: row.get("date"),
            available_doses: row.get("available_doses"),
            applicable_classes,
            venue: row.get("venue"),
            organizer: row.get("organizer"),
            notes: row.get("notes"),
        }
    }
}
