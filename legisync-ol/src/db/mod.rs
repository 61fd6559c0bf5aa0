//! Database access for legisync-ol

pub mod documents;

use legisync_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Opens the shared legisync database and ensures both the shared tables
/// and the import-specific tables exist.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    let pool = legisync_common::db::init_database_pool(db_path).await?;
    init_tables(&pool).await?;
    Ok(pool)
}

/// Initialize import-specific tables
///
/// Creates the `documents` table if it doesn't exist. Public so tests can
/// apply the schema to in-memory pools.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            doc_type TEXT NOT NULL,
            doc_id TEXT NOT NULL,
            payload TEXT NOT NULL,
            fetched_at TEXT NOT NULL,
            PRIMARY KEY (doc_type, doc_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("Import tables initialized (documents)");

    Ok(())
}
