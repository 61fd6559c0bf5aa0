//! Bill importer
//!
//! Bills are addressed upstream as `{session}/{printNo}` (e.g. `2021/S123`).
//! Update tokens carry the id as `{basePrintNo, session}`; session listings
//! return bill summaries with the same two fields at the top level, so one
//! extractor serves both feeds.

use crate::client::OpenlegClient;
use crate::error::Result;
use crate::importers::{fetch_and_store, ImportResult, Importer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

pub struct BillImporter {
    client: Arc<OpenlegClient>,
    db: SqlitePool,
}

impl BillImporter {
    pub fn new(client: Arc<OpenlegClient>, db: SqlitePool) -> Self {
        Self { client, db }
    }
}

#[async_trait]
impl Importer for BillImporter {
    fn resource(&self) -> &'static str {
        "bills"
    }

    async fn import_updates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ImportResult> {
        let tokens = self.client.updates(self.resource(), from, to).await?;

        let mut result = ImportResult::new();
        for token in tokens {
            match bill_id(&token.id) {
                Some(id) => {
                    let outcome =
                        fetch_and_store(&self.client, &self.db, self.resource(), &id).await;
                    result.record(id, outcome);
                }
                None => {
                    warn!(id = %token.id, "update token without a usable bill id");
                }
            }
        }
        Ok(result)
    }

    async fn import(&self, ids: &[String]) -> Result<ImportResult> {
        let mut result = ImportResult::new();
        for id in ids {
            let outcome = fetch_and_store(&self.client, &self.db, self.resource(), id).await;
            result.record(id.clone(), outcome);
        }
        Ok(result)
    }

    async fn ids_from_session(
        &self,
        session: i32,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<String>> {
        let items = self
            .client
            .search(self.resource(), session, limit, offset)
            .await?;

        Ok(items.iter().filter_map(bill_id).collect())
    }
}

/// Extract a canonical bill id from an id object or bill summary
fn bill_id(value: &serde_json::Value) -> Option<String> {
    let base = value.get("basePrintNo")?.as_str()?;
    let session = value.get("session")?.as_i64()?;

    if base.is_empty() {
        return None;
    }
    Some(format!("{}/{}", session, base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bill_id_from_update_token_id() {
        let id = json!({"basePrintNo": "S123", "session": 2021, "version": ""});
        assert_eq!(bill_id(&id), Some("2021/S123".to_string()));
    }

    #[test]
    fn test_bill_id_from_search_summary() {
        let item = json!({
            "basePrintNo": "A456",
            "session": 2023,
            "title": "An act to amend the public health law"
        });
        assert_eq!(bill_id(&item), Some("2023/A456".to_string()));
    }

    #[test]
    fn test_bill_id_rejects_incomplete() {
        assert_eq!(bill_id(&json!({"basePrintNo": "S123"})), None);
        assert_eq!(bill_id(&json!({"session": 2021})), None);
        assert_eq!(bill_id(&json!({"basePrintNo": "", "session": 2021})), None);
        assert_eq!(bill_id(&json!(null)), None);
    }
}
