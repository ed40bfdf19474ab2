use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

/// DbConnection manages the SQLite pool shared by all repositories
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection, creating the database and its
    /// schema if they do not exist yet
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
        }

        let pool = SqlitePool::connect(url).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize a test database with a unique shared in-memory name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS students (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                class TEXT NOT NULL,
                student_id TEXT NOT NULL UNIQUE,
                guardian TEXT,
                date_of_birth TEXT,
                gender TEXT,
                contact_number TEXT,
                address TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Natural-key lookups drive the CSV upsert path
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_students_student_id
            ON students(student_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vaccination_drives (
                id TEXT PRIMARY KEY,
                vaccine_name TEXT NOT NULL,
                date TEXT NOT NULL,
                available_doses INTEGER NOT NULL,
                applicable_classes TEXT NOT NULL,
                venue TEXT,
                organizer TEXT,
                notes TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Overlap checks query by vaccine name and calendar day
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_drives_vaccine_date
            ON vaccination_drives(vaccine_name, date);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vaccination_records (
                id TEXT PRIMARY KEY,
                student_id TEXT NOT NULL,
                vaccination_drive_id TEXT NOT NULL,
                vaccinated INTEGER NOT NULL DEFAULT 0,
                vaccination_date TEXT,
                administered_by TEXT,
                batch_number TEXT,
                notes TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_records_student_id
            ON vaccination_records(student_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
