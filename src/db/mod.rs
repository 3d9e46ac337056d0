//! SQLite persistence layer: pool management, schema, and repositories.

pub mod models;
pub mod sessions;
pub mod sponsorships;
pub mod users;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Manages a single SQLite pool; creates the database file if missing.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database at the given path and ensure the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or schema setup fails.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        info!("Initializing SQLite pool: {}", database_url);

        let options = SqliteConnectOptions::new()
            .create_if_missing(true)
            .filename(database_url);

        let pool = SqlitePool::connect_with(options).await?;
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// In-memory database for tests. A single connection keeps all queries
    /// on the same memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or schema setup fails.
    pub async fn connect_in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Returns the underlying pool for running queries.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        info!("Creating database tables if not exist");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                role TEXT NOT NULL,
                chat_id INTEGER,
                profile_image TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                otp TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sponsorships (
                id TEXT PRIMARY KEY,
                type TEXT NOT NULL,
                image TEXT NOT NULL,
                title TEXT,
                description TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_chat_id ON users(chat_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_username ON sessions(username)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Role;
    use crate::db::users::NewUser;

    #[tokio::test]
    async fn connect_creates_the_database_file_and_schema() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("konfess-test.db");
        let db = Database::connect(path.to_str().expect("utf8 path"))
            .await
            .expect("connect");
        assert!(path.exists());

        users::create(
            db.pool(),
            NewUser {
                name: "Bopha".to_string(),
                username: "bopha".to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
                chat_id: None,
                profile_image: None,
            },
        )
        .await
        .expect("schema is usable");
    }
}
