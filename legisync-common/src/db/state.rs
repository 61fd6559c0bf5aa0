//! Persistent run-state store
//!
//! Per-resource synchronization state (lock flag, lock timestamp, run
//! watermarks) lives in the `sync_state` table following the key-value
//! pattern. Keys are dotted strings `<namespace>.<resource>.<name>`, so each
//! resource type's state is independent of every other type's.
//!
//! The store is expressed as a trait so the synchronization components can
//! be exercised against any backend; production wires [`SqliteStateStore`]
//! over the shared pool.

use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

/// Keyed run-state persistence
///
/// `resource` is the resource-type segment of the key (`bills`, `agendas`,
/// ...); `name` is the state field (`locked`, `last_run_updates`, ...).
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a state value; None if never written
    async fn get(&self, resource: &str, name: &str) -> Result<Option<String>>;

    /// Write a state value, overwriting any previous value in place
    async fn set(&self, resource: &str, name: &str, value: &str) -> Result<()>;

    /// Integer view of a state value
    ///
    /// **Returns:** None if never written; Err if present but not an integer
    async fn get_i64(&self, resource: &str, name: &str) -> Result<Option<i64>> {
        match self.get(resource, name).await? {
            Some(value) => value.parse::<i64>().map(Some).map_err(|e| {
                Error::Internal(format!(
                    "state value {}.{} is not an integer: {}",
                    resource, name, e
                ))
            }),
            None => Ok(None),
        }
    }
}

/// SQLite-backed state store over the `sync_state` table
pub struct SqliteStateStore {
    db: Pool<Sqlite>,
    namespace: String,
}

impl SqliteStateStore {
    pub fn new(db: Pool<Sqlite>, namespace: impl Into<String>) -> Self {
        Self {
            db,
            namespace: namespace.into(),
        }
    }

    fn key(&self, resource: &str, name: &str) -> String {
        format!("{}.{}.{}", self.namespace, resource, name)
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn get(&self, resource: &str, name: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM sync_state WHERE key = ?")
            .bind(self.key(resource, name))
            .fetch_optional(&self.db)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, resource: &str, name: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO sync_state (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(self.key(resource, name))
        .bind(value)
        .execute(&self.db)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
