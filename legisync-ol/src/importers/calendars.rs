//! Calendar importer
//!
//! Floor calendars are addressed as `{year}/{calNo}`.

use crate::client::OpenlegClient;
use crate::error::Result;
use crate::importers::{fetch_and_store, ImportResult, Importer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

pub struct CalendarImporter {
    client: Arc<OpenlegClient>,
    db: SqlitePool,
}

impl CalendarImporter {
    pub fn new(client: Arc<OpenlegClient>, db: SqlitePool) -> Self {
        Self { client, db }
    }
}

#[async_trait]
impl Importer for CalendarImporter {
    fn resource(&self) -> &'static str {
        "calendars"
    }

    async fn import_updates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ImportResult> {
        let tokens = self.client.updates(self.resource(), from, to).await?;

        let mut result = ImportResult::new();
        for token in tokens {
            match calendar_id(&token.id) {
                Some(id) => {
                    let outcome =
                        fetch_and_store(&self.client, &self.db, self.resource(), &id).await;
                    result.record(id, outcome);
                }
                None => {
                    warn!(id = %token.id, "update token without a usable calendar id");
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

        Ok(items
            .iter()
            .filter_map(|item| {
                item.get("id")
                    .and_then(calendar_id)
                    .or_else(|| calendar_id(item))
            })
            .collect())
    }
}

/// Extract a canonical calendar id from an id object
fn calendar_id(value: &serde_json::Value) -> Option<String> {
    let year = value.get("year")?.as_i64()?;
    let number = value.get("calendarNumber").or_else(|| value.get("calNo"))?.as_i64()?;
    Some(format!("{}/{}", year, number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_calendar_id_variants() {
        assert_eq!(
            calendar_id(&json!({"year": 2021, "calendarNumber": 5})),
            Some("2021/5".to_string())
        );
        assert_eq!(
            calendar_id(&json!({"year": 2021, "calNo": 5})),
            Some("2021/5".to_string())
        );
        assert_eq!(calendar_id(&json!({"year": 2021})), None);
    }
}
