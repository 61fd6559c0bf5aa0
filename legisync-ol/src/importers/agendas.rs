//! Agenda importer
//!
//! Agendas are addressed as `{year}/{agendaNo}`. Update tokens carry the id
//! flat (`{year, number}`); listing items nest it under `id`.

use crate::client::OpenlegClient;
use crate::error::Result;
use crate::importers::{fetch_and_store, ImportResult, Importer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

pub struct AgendaImporter {
    client: Arc<OpenlegClient>,
    db: SqlitePool,
}

impl AgendaImporter {
    pub fn new(client: Arc<OpenlegClient>, db: SqlitePool) -> Self {
        Self { client, db }
    }
}

#[async_trait]
impl Importer for AgendaImporter {
    fn resource(&self) -> &'static str {
        "agendas"
    }

    async fn import_updates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ImportResult> {
        let tokens = self.client.updates(self.resource(), from, to).await?;

        let mut result = ImportResult::new();
        for token in tokens {
            match agenda_id(&token.id) {
                Some(id) => {
                    let outcome =
                        fetch_and_store(&self.client, &self.db, self.resource(), &id).await;
                    result.record(id, outcome);
                }
                None => {
                    warn!(id = %token.id, "update token without a usable agenda id");
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

        // Listing items nest the id object; fall back to a flat shape
        Ok(items
            .iter()
            .filter_map(|item| item.get("id").and_then(agenda_id).or_else(|| agenda_id(item)))
            .collect())
    }
}

/// Extract a canonical agenda id from an id object
fn agenda_id(value: &serde_json::Value) -> Option<String> {
    let year = value.get("year")?.as_i64()?;
    let number = value.get("number")?.as_i64()?;
    Some(format!("{}/{}", year, number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agenda_id_flat() {
        let id = json!({"year": 2021, "number": 14});
        assert_eq!(agenda_id(&id), Some("2021/14".to_string()));
    }

    #[test]
    fn test_agenda_id_rejects_incomplete() {
        assert_eq!(agenda_id(&json!({"year": 2021})), None);
        assert_eq!(agenda_id(&json!({"number": 14})), None);
    }

    #[test]
    fn test_nested_listing_shape() {
        let item = json!({"id": {"year": 2021, "number": 3}, "totalAddendum": 1});
        let extracted = item.get("id").and_then(agenda_id).or_else(|| agenda_id(&item));
        assert_eq!(extracted, Some("2021/3".to_string()));
    }
}
