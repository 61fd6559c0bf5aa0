//! Window and option resolution
//!
//! Defaulting rules for an incremental run's time window and normalization
//! of operator-supplied id lists.

use crate::error::Result;
use chrono::{DateTime, Utc};
use legisync_common::db::state::StateStore;
use legisync_common::time;
use std::collections::BTreeSet;

/// State field: watermark of the last successful incremental run
pub const STATE_LAST_RUN_UPDATES: &str = "last_run_updates";
/// State field: unix seconds of the last successful explicit run
pub const STATE_LAST_RUN: &str = "last_run";

/// A resolved `[from, to)` window for an incremental run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// True when the caller supplied `to` explicitly — a historical
    /// backfill run that must not advance the stored watermark
    pub explicit_to: bool,
}

/// Resolve the window for an incremental run
///
/// `from` defaults to the stored watermark (epoch when no successful run
/// has been recorded); `to` defaults to now.
pub async fn resolve_window(
    store: &dyn StateStore,
    resource: &str,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<Window> {
    let from = match from {
        Some(t) => t,
        None => {
            let watermark = store
                .get_i64(resource, STATE_LAST_RUN_UPDATES)
                .await?
                .unwrap_or(0);
            time::from_unix(watermark)
        }
    };

    let explicit_to = to.is_some();
    let to = to.unwrap_or_else(time::now);

    Ok(Window {
        from,
        to,
        explicit_to,
    })
}

/// Normalize operator-supplied record ids
///
/// Flattens repeated and comma-delimited occurrences into one set, trims
/// whitespace, drops empties, and rewrites `-` to `/` (ids are typed as
/// `2021-S123` but addressed upstream as `2021/S123`). The set is ordered
/// and de-duplicated.
pub fn normalize_ids(raw: &[String]) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();

    for occurrence in raw {
        for part in occurrence.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            ids.insert(part.replace('-', "/"));
        }
    }

    ids
}

/// Session search page size; 0 leaves the size to the upstream default
pub fn resolve_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(0)
}

/// Session search page offset; upstream pagination is 1-based
pub fn resolve_offset(offset: Option<u32>) -> u32 {
    offset.unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use legisync_common::db::state::SqliteStateStore;
    use sqlx::SqlitePool;
    use std::sync::Arc;

    async fn setup_store() -> Arc<SqliteStateStore> {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        legisync_common::db::init_tables(&pool).await.unwrap();
        Arc::new(SqliteStateStore::new(pool, "openleg"))
    }

    #[tokio::test]
    async fn test_window_defaults_to_epoch_without_state() {
        let store = setup_store().await;

        let window = resolve_window(store.as_ref(), "bills", None, None)
            .await
            .unwrap();

        assert_eq!(window.from.timestamp(), 0);
        assert!(!window.explicit_to);
        assert!(window.to.timestamp() > 0);
    }

    #[tokio::test]
    async fn test_window_defaults_from_watermark() {
        let store = setup_store().await;
        store
            .set("bills", STATE_LAST_RUN_UPDATES, "1672531200")
            .await
            .unwrap();

        let window = resolve_window(store.as_ref(), "bills", None, None)
            .await
            .unwrap();

        assert_eq!(window.from.timestamp(), 1_672_531_200);
    }

    #[tokio::test]
    async fn test_window_explicit_bounds_win() {
        let store = setup_store().await;
        store
            .set("bills", STATE_LAST_RUN_UPDATES, "1672531200")
            .await
            .unwrap();

        let from = time::from_unix(100);
        let to = time::from_unix(200);
        let window = resolve_window(store.as_ref(), "bills", Some(from), Some(to))
            .await
            .unwrap();

        assert_eq!(window.from, from);
        assert_eq!(window.to, to);
        assert!(window.explicit_to);
    }

    #[test]
    fn test_normalize_ids_comma_and_repeat_equivalent() {
        let comma = normalize_ids(&["2021-S123,2021-S456".to_string()]);
        let repeated = normalize_ids(&["2021-S123".to_string(), "2021-S456".to_string()]);

        assert_eq!(comma, repeated);
        let expected: BTreeSet<String> =
            ["2021/S123", "2021/S456"].iter().map(|s| s.to_string()).collect();
        assert_eq!(comma, expected);
    }

    #[test]
    fn test_normalize_ids_dedup_trim_and_drop_empty() {
        let ids = normalize_ids(&[
            " 2021-S123 ,,2021-S123".to_string(),
            "".to_string(),
            "2021/S123".to_string(),
        ]);

        assert_eq!(ids.len(), 1);
        assert!(ids.contains("2021/S123"));
    }

    #[test]
    fn test_normalize_ids_replaces_every_hyphen() {
        let ids = normalize_ids(&["2021-S123-A".to_string()]);
        assert!(ids.contains("2021/S123/A"));
    }

    #[test]
    fn test_numeric_defaults() {
        assert_eq!(resolve_limit(None), 0);
        assert_eq!(resolve_offset(None), 1);
        assert_eq!(resolve_limit(Some(10)), 10);
        assert_eq!(resolve_offset(Some(3)), 3);
    }
}
