//! Advisory per-resource run lock
//!
//! The lock is a persisted flag, not a mutual-exclusion primitive: the
//! check-then-set below has a race window between near-simultaneous
//! invocations. Deployments run one cron writer per resource type; --force
//! exists for manual recovery after a hard kill left the flag set.

use crate::error::{ImportError, Result};
use legisync_common::db::state::StateStore;
use legisync_common::time;
use std::sync::Arc;
use tracing::info;

/// State field: "1" while a run is in flight
pub const STATE_LOCKED: &str = "locked";
/// State field: unix seconds at which the lock was last taken
pub const STATE_LOCK_TIMESTAMP: &str = "lock_timestamp";

pub struct LockManager {
    store: Arc<dyn StateStore>,
}

impl LockManager {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Take the lock for `resource`
    ///
    /// Fails with [`ImportError::Locked`] (naming the time the lock was
    /// set) when a run is already in flight and `force` is false. With
    /// `force`, the override is logged and the lock is re-stamped to now.
    pub async fn try_acquire(&self, resource: &str, force: bool) -> Result<()> {
        let locked = self
            .store
            .get(resource, STATE_LOCKED)
            .await?
            .map(|v| v == "1")
            .unwrap_or(false);

        if locked {
            let since_secs = self
                .store
                .get_i64(resource, STATE_LOCK_TIMESTAMP)
                .await?
                .unwrap_or(0);
            let since = time::from_unix(since_secs);

            if !force {
                return Err(ImportError::Locked {
                    resource: resource.to_string(),
                    since,
                });
            }

            info!(resource, held_since = %since, "lock held; overriding due to --force");
        }

        let now = time::now();
        self.store.set(resource, STATE_LOCKED, "1").await?;
        self.store
            .set(resource, STATE_LOCK_TIMESTAMP, &now.timestamp().to_string())
            .await?;

        Ok(())
    }

    /// Release the lock for `resource` unconditionally
    pub async fn release(&self, resource: &str) -> Result<()> {
        self.store.set(resource, STATE_LOCKED, "0").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legisync_common::db::state::SqliteStateStore;
    use sqlx::SqlitePool;

    async fn setup_lock() -> (LockManager, Arc<SqliteStateStore>) {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        legisync_common::db::init_tables(&pool).await.unwrap();
        let store = Arc::new(SqliteStateStore::new(pool, "openleg"));
        (LockManager::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_acquire_when_free() {
        let (lock, store) = setup_lock().await;

        lock.try_acquire("bills", false).await.unwrap();

        assert_eq!(
            store.get("bills", STATE_LOCKED).await.unwrap(),
            Some("1".to_string())
        );
        assert!(store
            .get_i64("bills", STATE_LOCK_TIMESTAMP)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_acquire_blocked_when_held() {
        let (lock, store) = setup_lock().await;
        store.set("bills", STATE_LOCKED, "1").await.unwrap();
        store
            .set("bills", STATE_LOCK_TIMESTAMP, "1672531200")
            .await
            .unwrap();

        let result = lock.try_acquire("bills", false).await;

        match result {
            Err(ImportError::Locked { resource, since }) => {
                assert_eq!(resource, "bills");
                assert_eq!(since.timestamp(), 1_672_531_200);
            }
            other => panic!("expected Locked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_force_overrides_and_restamps() {
        let (lock, store) = setup_lock().await;
        store.set("bills", STATE_LOCKED, "1").await.unwrap();
        store
            .set("bills", STATE_LOCK_TIMESTAMP, "1672531200")
            .await
            .unwrap();

        let start = time::now().timestamp();
        lock.try_acquire("bills", true).await.unwrap();

        let stamped = store
            .get_i64("bills", STATE_LOCK_TIMESTAMP)
            .await
            .unwrap()
            .unwrap();
        assert!(stamped >= start, "lock_timestamp must be re-stamped");
        assert_eq!(
            store.get("bills", STATE_LOCKED).await.unwrap(),
            Some("1".to_string())
        );
    }

    #[tokio::test]
    async fn test_release_clears_flag() {
        let (lock, store) = setup_lock().await;

        lock.try_acquire("bills", false).await.unwrap();
        lock.release("bills").await.unwrap();

        assert_eq!(
            store.get("bills", STATE_LOCKED).await.unwrap(),
            Some("0".to_string())
        );
    }

    #[tokio::test]
    async fn test_locks_are_per_resource() {
        let (lock, _store) = setup_lock().await;

        lock.try_acquire("bills", false).await.unwrap();
        // agendas is independent of the bills lock
        lock.try_acquire("agendas", false).await.unwrap();
    }
}
