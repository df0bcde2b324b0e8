//! services/api/src/adapters/kv_store.rs
//!
//! This module contains the SQLite adapter, the persistent implementation of the
//! `KeyValueStore` port from the `core` crate. Each key maps to one row holding
//! the JSON-encoded value.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, FromRow, SqlitePool};
use tutor_core::ports::{KeyValueStore, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A key-value adapter backed by a single SQLite table.
#[derive(Clone)]
pub struct SqliteKvAdapter {
    pool: SqlitePool,
}

impl SqliteKvAdapter {
    /// Creates a new `SqliteKvAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url`.
    ///
    /// In-memory databases are private to a connection, so the pool is capped
    /// at one connection for those.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct EntryRecord {
    value: String,
}

impl EntryRecord {
    fn to_value(&self, key: &str) -> PortResult<Value> {
        serde_json::from_str(&self.value)
            .map_err(|e| PortError::Unexpected(format!("corrupt JSON under '{}': {}", key, e)))
    }
}

//=========================================================================================
// `KeyValueStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl KeyValueStore for SqliteKvAdapter {
    async fn get(&self, key: &str) -> PortResult<Option<Value>> {
        let record = sqlx::query_as::<_, EntryRecord>("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        record.map(|r| r.to_value(key)).transpose()
    }

    async fn set(&self, key: &str, value: Value) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP) \
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
