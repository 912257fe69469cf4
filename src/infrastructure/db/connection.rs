use crate::domain::error::{AppError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// One of the two supported connection pools, picked by URL scheme.
#[derive(Debug, Clone)]
pub enum DbPool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

/// Handle to the feedback store. Cheap to clone; shared across handlers.
#[derive(Debug, Clone)]
pub struct Store {
    pub(crate) pool: DbPool,
}

const SQLITE_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS upload_batches (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        filename TEXT NOT NULL,
        total_count INTEGER NOT NULL DEFAULT 0,
        headers TEXT,
        uploaded_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS feedbacks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        upload_batch_id INTEGER NOT NULL,
        user_type TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT '',
        attachment TEXT NOT NULL DEFAULT '',
        original_row TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS kanban_categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        batch_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        color TEXT NOT NULL DEFAULT '#3B82F6',
        sort_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS kanban_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        feedback_id INTEGER NOT NULL,
        category_id INTEGER,
        note TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        added_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
];

// BIGSERIAL / BIGINT keep id and count types identical across backends.
const POSTGRES_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS upload_batches (
        id BIGSERIAL PRIMARY KEY,
        filename TEXT NOT NULL,
        total_count BIGINT NOT NULL DEFAULT 0,
        headers TEXT,
        uploaded_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS feedbacks (
        id BIGSERIAL PRIMARY KEY,
        upload_batch_id BIGINT NOT NULL,
        user_type TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT '',
        attachment TEXT NOT NULL DEFAULT '',
        original_row TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS kanban_categories (
        id BIGSERIAL PRIMARY KEY,
        batch_id BIGINT NOT NULL,
        name TEXT NOT NULL,
        color TEXT NOT NULL DEFAULT '#3B82F6',
        sort_order BIGINT NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS kanban_items (
        id BIGSERIAL PRIMARY KEY,
        feedback_id BIGINT NOT NULL,
        category_id BIGINT,
        note TEXT,
        sort_order BIGINT NOT NULL DEFAULT 0,
        added_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
];

impl Store {
    /// Connect to the database named by `database_url` and bootstrap the
    /// schema. `postgres://` / `postgresql://` URLs get the Postgres pool,
    /// everything else is treated as SQLite.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = if database_url.starts_with("postgres://")
            || database_url.starts_with("postgresql://")
        {
            let pool = PgPoolOptions::new()
                .max_connections(8)
                .acquire_timeout(Duration::from_secs(5))
                .connect(database_url)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to connect to Postgres: {}", e))
                })?;
            DbPool::Postgres(pool)
        } else {
            let options = SqliteConnectOptions::from_str(database_url)
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to parse connection string: {}", e))
                })?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5));

            // An in-memory database exists per connection; keep the pool at
            // one connection so every query sees the same tables.
            let max_connections = if database_url.contains(":memory:") { 1 } else { 4 };
            let pool = SqlitePoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect_with(options)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to connect to SQLite: {}", e))
                })?;
            DbPool::Sqlite(pool)
        };

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        match &self.pool {
            DbPool::Sqlite(pool) => {
                for statement in SQLITE_SCHEMA {
                    sqlx::query(statement).execute(pool).await.map_err(|e| {
                        AppError::DatabaseError(format!("Failed to create table: {}", e))
                    })?;
                }
            }
            DbPool::Postgres(pool) => {
                for statement in POSTGRES_SCHEMA {
                    sqlx::query(statement).execute(pool).await.map_err(|e| {
                        AppError::DatabaseError(format!("Failed to create table: {}", e))
                    })?;
                }
            }
        }
        Ok(())
    }
}
