use anyhow::Result;
use shared::Student;
use sqlx::Row;

use crate::storage::db::DbConnection;

/// Repository for student operations
#[derive(Clone)]
pub struct StudentRepository {
    db: DbConnection,
}

impl StudentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a student in the database
    pub async fn store_student(&self, student: &Student) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO students
                (id, name, class, student_id, guardian, date_of_birth, gender, contact_number, address)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&student.id)
        .bind(&student.name)
        .bind(&student.class)
        .bind(&student.student_id)
        .bind(&student.guardian)
        .bind(&student.date_of_birth)
        .bind(&student.gender)
        .bind(&student.contact_number)
        .bind(&student.address)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Get a student by system id
    pub async fn get_student(&self, id: &str) -> Result<Option<Student>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, class, student_id, guardian, date_of_birth, gender, contact_number, address
            FROM students
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_student))
    }

    /// Look a student up by the human-readable studentId natural key
    pub async fn find_by_student_id(&self, student_id: &str) -> Result<Option<Student>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, class, student_id, guardian, date_of_birth, gender, contact_number, address
            FROM students
            WHERE student_id = ?
            "#,
        )
        .bind(student_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_student))
    }

    /// List all students ordered by name
    pub async fn list_students(&self) -> Result<Vec<Student>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, class, student_id, guardian, date_of_birth, gender, contact_number, address
            FROM students
            ORDER BY name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_student).collect())
    }

    /// Overwrite a student's fields (full-record update)
    pub async fn update_student(&self, student: &Student) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE students
            SET name = ?, class = ?, student_id = ?, guardian = ?, date_of_birth = ?,
                gender = ?, contact_number = ?, address = ?
            WHERE id = ?
            "#,
        )
        .bind(&student.name)
        .bind(&student.class)
        .bind(&student.student_id)
        .bind(&student.guardian)
        .bind(&student.date_of_birth)
        .bind(&student.gender)
        .bind(&student.contact_number)
        .bind(&student.address)
        .bind(&student.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a student by system id
    pub async fn delete_student(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Count all students
    pub async fn count_students(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    fn row_to_student(row: &sqlx::sqlite::SqliteRow) -> Student {
        Student {
            id: row.get("id"),
            name: row.get("name"),
            class: row.get("class"),
            student_id: row.get("student_id"),
            guardian: row.get("guardian"),
            date_of_birth: row.get("date_of_birth"),
            gender: row.get("gender"),
            contact_number: row.get("contact_number"),
            address: row.get("address"),
        }
    }
}
