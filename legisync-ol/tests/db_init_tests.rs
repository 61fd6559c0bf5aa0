//! Database initialization tests
//!
//! Verifies that opening the database creates the full schema, that the
//! parent directory is created on demand, and that re-opening is
//! idempotent.

use tempfile::TempDir;

#[tokio::test]
async fn init_creates_schema_and_parent_directory() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("legisync.db");

    let pool = legisync_ol::db::init_database_pool(&db_path).await.unwrap();

    assert!(db_path.exists(), "database file must be created");

    // Both the shared and the import-specific tables must exist
    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();

    assert!(names.contains(&"sync_state"));
    assert!(names.contains(&"documents"));
}

#[tokio::test]
async fn reopening_is_idempotent_and_keeps_data() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("legisync.db");

    {
        let pool = legisync_ol::db::init_database_pool(&db_path).await.unwrap();
        sqlx::query("INSERT INTO sync_state (key, value) VALUES ('openleg.bills.locked', '0')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }

    let pool = legisync_ol::db::init_database_pool(&db_path).await.unwrap();
    let value: (String,) =
        sqlx::query_as("SELECT value FROM sync_state WHERE key = 'openleg.bills.locked'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(value.0, "0");
}
