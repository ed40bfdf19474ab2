use anyhow::Result;
use shared::VaccinationRecord;
use sqlx::Row;

use crate::storage::db::DbConnection;

/// Repository for vaccination record operations
#[derive(Clone)]
pub struct RecordRepository {
    db: DbConnection,
}

impl RecordRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a record in the database
    pub async fn store_record(&self, record: &VaccinationRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vaccination_records
                (id, student_id, vaccination_drive_id, vaccinated, vaccination_date,
                 administered_by, batch_number, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.student_id)
        .bind(&record.vaccination_drive_id)
        .bind(record.vaccinated)
        .bind(&record.vaccination_date)
        .bind(&record.administered_by)
        .bind(&record.batch_number)
        .bind(&record.notes)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Get a record by id
    pub async fn get_record(&self, id: &str) -> Result<Option<VaccinationRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, student_id, vaccination_drive_id, vaccinated, vaccination_date,
                   administered_by, batch_number, notes
            FROM vaccination_records
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_record))
    }

    /// List all records
    pub async fn list_records(&self) -> Result<Vec<VaccinationRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, vaccination_drive_id, vaccinated, vaccination_date,
                   administered_by, batch_number, notes
            FROM vaccination_records
            ORDER BY ROWID ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_record).collect())
    }

    /// Overwrite a record's fields (full-record update)
    pub async fn update_record(&self, record: &VaccinationRecord) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE vaccination_records
            SET student_id = ?, vaccination_drive_id = ?, vaccinated = ?, vaccination_date = ?,
                administered_by = ?, batch_number = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.student_id)
        .bind(&record.vaccination_drive_id)
        .bind(record.vaccinated)
        .bind(&record.vaccination_date)
        .bind(&record.administered_by)
        .bind(&record.batch_number)
        .bind(&record.notes)
        .bind(&record.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a record by id
    pub async fn delete_record(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM vaccination_records WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Whether the student already has any record whose drive carries
    /// the given vaccine name. Name-keyed on purpose: a student
    /// vaccinated through drive A must not be re-enrolled in drive B
    /// for the same vaccine.
    pub async fn student_has_vaccine(&self, student_id: &str, vaccine_name: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM vaccination_records r
            JOIN vaccination_drives d ON d.id = r.vaccination_drive_id
            WHERE r.student_id = ? AND d.vaccine_name = ?
            "#,
        )
        .bind(student_id)
        .bind(vaccine_name)
        .fetch_one(self.db.pool())
        .await?;

        Ok(count > 0)
    }

    /// Count records marked vaccinated (a student vaccinated twice counts twice)
    pub async fn count_vaccinated_records(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vaccination_records WHERE vaccinated = 1",
        )
        .fetch_one(self.db.pool())
        .await?;
        Ok(count)
    }

    /// Count distinct students with at least one vaccinated record
    pub async fn count_vaccinated_students(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT student_id) FROM vaccination_records WHERE vaccinated = 1",
        )
        .fetch_one(self.db.pool())
        .await?;
        Ok(count)
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> VaccinationRecord {
        VaccinationRecord {
            id: row.get("id"),
            student_id: row.get("student_id"),
            vaccination_drive_id: row.get("vaccination_drive_id"),
            vaccinated: row.get("vaccinated"),
            vaccination_date: row.get("vaccination_date"),
            administered_by: row.get("administered_by"),
            batch_number: row.get("batch_number"),
            notes: row.get("notes"),
        }
    }
}
