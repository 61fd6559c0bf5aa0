//! Document persistence
//!
//! Fetched upstream payloads land in the `documents` table as raw JSON,
//! keyed by `(doc_type, doc_id)`. Upserted in place; the table keeps only
//! the latest payload per record.

use legisync_common::{time, Error, Result};
use sqlx::{Pool, Sqlite};

/// Upsert one fetched document payload
pub async fn save_document(
    db: &Pool<Sqlite>,
    doc_type: &str,
    doc_id: &str,
    payload: &serde_json::Value,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO documents (doc_type, doc_id, payload, fetched_at) VALUES (?, ?, ?, ?)
         ON CONFLICT(doc_type, doc_id) DO UPDATE
         SET payload = excluded.payload, fetched_at = excluded.fetched_at",
    )
    .bind(doc_type)
    .bind(doc_id)
    .bind(payload.to_string())
    .bind(time::now().to_rfc3339())
    .execute(db)
    .await
    .map_err(Error::Database)?;

    Ok(())
}

/// Load a stored document payload
///
/// **Returns:** Some(payload) if stored, None if never fetched
pub async fn get_document(
    db: &Pool<Sqlite>,
    doc_type: &str,
    doc_id: &str,
) -> Result<Option<serde_json::Value>> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT payload FROM documents WHERE doc_type = ? AND doc_id = ?")
            .bind(doc_type)
            .bind(doc_id)
            .fetch_optional(db)
            .await
            .map_err(Error::Database)?;

    match row {
        Some((payload,)) => {
            let value = serde_json::from_str(&payload).map_err(|e| {
                Error::Internal(format!("stored document {}/{} is not valid JSON: {}", doc_type, doc_id, e))
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Count stored documents of one type
pub async fn count_documents(db: &Pool<Sqlite>, doc_type: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE doc_type = ?")
        .bind(doc_type)
        .fetch_one(db)
        .await
        .map_err(Error::Database)?;

    Ok(count)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::SqlitePool;

    /// Setup in-memory test database with the documents table
    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_get_unsaved_returns_none() {
        let pool = setup_test_db().await;

        let result = get_document(&pool, "bills", "2021/S123").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_save_then_get_roundtrip() {
        let pool = setup_test_db().await;
        let payload = json!({"basePrintNo": "S123", "session": 2021, "title": "An act"});

        save_document(&pool, "bills", "2021/S123", &payload)
            .await
            .unwrap();

        let stored = get_document(&pool, "bills", "2021/S123").await.unwrap();
        assert_eq!(stored, Some(payload));
    }

    #[tokio::test]
    async fn test_save_upserts_in_place() {
        let pool = setup_test_db().await;

        save_document(&pool, "bills", "2021/S123", &json!({"v": 1}))
            .await
            .unwrap();
        save_document(&pool, "bills", "2021/S123", &json!({"v": 2}))
            .await
            .unwrap();

        let stored = get_document(&pool, "bills", "2021/S123").await.unwrap();
        assert_eq!(stored, Some(json!({"v": 2})));
        assert_eq!(count_documents(&pool, "bills").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_types_do_not_collide() {
        let pool = setup_test_db().await;

        save_document(&pool, "bills", "2021/1", &json!({"kind": "bill"}))
            .await
            .unwrap();
        save_document(&pool, "agendas", "2021/1", &json!({"kind": "agenda"}))
            .await
            .unwrap();

        assert_eq!(count_documents(&pool, "bills").await.unwrap(), 1);
        assert_eq!(count_documents(&pool, "agendas").await.unwrap(), 1);
        let agenda = get_document(&pool, "agendas", "2021/1").await.unwrap();
        assert_eq!(agenda, Some(json!({"kind": "agenda"})));
    }
}
