//! Synchronization runner
//!
//! Drives one import invocation end to end:
//! `resolve importer -> acquire lock -> run importer -> report ->
//! persist watermark -> release lock`.
//!
//! The importer lookup happens before the lock so an unknown resource type
//! aborts without touching any state. The lock is released on every path
//! that reaches the importer call, including importer failure.

use crate::error::{ImportError, Result};
use crate::importers::{ImporterRegistry, ImportResult};
use crate::sync::lock::LockManager;
use crate::sync::report::report;
use crate::sync::window::{
    normalize_ids, resolve_limit, resolve_offset, resolve_window, STATE_LAST_RUN,
    STATE_LAST_RUN_UPDATES,
};
use chrono::{DateTime, Utc};
use legisync_common::db::state::StateStore;
use legisync_common::time;
use std::sync::Arc;
use tracing::{error, info};

pub struct SyncRunner {
    registry: ImporterRegistry,
    store: Arc<dyn StateStore>,
    lock: LockManager,
}

impl SyncRunner {
    pub fn new(registry: ImporterRegistry, store: Arc<dyn StateStore>) -> Self {
        let lock = LockManager::new(store.clone());
        Self {
            registry,
            store,
            lock,
        }
    }

    /// Incremental sync over a resolved time window
    ///
    /// After a successful run the watermark advances to the window's end,
    /// unless the caller supplied `to` explicitly (backfill semantics).
    pub async fn run_updates(
        &self,
        resource: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        force: bool,
    ) -> Result<ImportResult> {
        let importer = self.registry.get(resource)?;
        let window = resolve_window(self.store.as_ref(), resource, from, to).await?;

        self.lock.try_acquire(resource, force).await?;

        info!(
            resource,
            from = %window.from,
            to = %window.to,
            "starting incremental import"
        );

        let result = match importer.import_updates(window.from, window.to).await {
            Ok(result) => result,
            Err(err) => {
                self.release_after_failure(resource).await;
                return Err(err);
            }
        };

        report(resource, &result);

        if !window.explicit_to {
            self.store
                .set(
                    resource,
                    STATE_LAST_RUN_UPDATES,
                    &window.to.timestamp().to_string(),
                )
                .await?;
        }

        self.lock.release(resource).await?;

        Ok(result)
    }

    /// Explicit sync of an enumerated id set and/or a session search page
    pub async fn run_import(
        &self,
        resource: &str,
        ids: &[String],
        session: Option<i32>,
        limit: Option<u32>,
        offset: Option<u32>,
        force: bool,
    ) -> Result<ImportResult> {
        let importer = self.registry.get(resource)?;

        if ids.is_empty() && session.is_none() {
            return Err(ImportError::InvalidInput(
                "nothing to import; supply --ids and/or --session".to_string(),
            ));
        }

        let mut id_set = normalize_ids(ids);

        self.lock.try_acquire(resource, force).await?;

        if let Some(year) = session {
            let limit = resolve_limit(limit);
            let offset = resolve_offset(offset);

            let found = match importer.ids_from_session(year, limit, offset).await {
                Ok(found) => found,
                Err(err) => {
                    self.release_after_failure(resource).await;
                    return Err(err);
                }
            };

            info!(
                resource,
                session = year,
                limit,
                offset,
                found = found.len(),
                "session search resolved candidate ids"
            );
            id_set.extend(found);
        }

        let id_list: Vec<String> = id_set.into_iter().collect();
        info!(resource, count = id_list.len(), "starting explicit import");

        let result = match importer.import(&id_list).await {
            Ok(result) => result,
            Err(err) => {
                self.release_after_failure(resource).await;
                return Err(err);
            }
        };

        report(resource, &result);

        self.store
            .set(
                resource,
                STATE_LAST_RUN,
                &time::now().timestamp().to_string(),
            )
            .await?;

        self.lock.release(resource).await?;

        Ok(result)
    }

    /// Release the lock on a failed run; the run's own error wins over a
    /// release failure
    async fn release_after_failure(&self, resource: &str) {
        if let Err(release_err) = self.lock.release(resource).await {
            error!(
                resource,
                error = %release_err,
                "failed to release import lock after error"
            );
        }
    }
}
