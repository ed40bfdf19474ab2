use anyhow::Result;
use shared::User;
use sqlx::Row;

use crate::storage::db::DbConnection;

/// A user row as persisted, including the password hash. This type
/// never crosses the HTTP boundary; callers get [`shared::User`] via
/// [`UserRow::to_user`].
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    /// Strip the password hash for serialization back to callers
    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// Repository for user operations
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a user in the database
    pub async fn store_user(&self, user: &UserRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Get a user by system id
    pub async fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    /// Find a user by email (emails are stored lowercased)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    /// Find a user holding either the username or the email, for
    /// duplicate detection at registration
    pub async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE username = ? OR email = ?
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> UserRow {
        UserRow {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}
