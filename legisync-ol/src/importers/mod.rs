//! Importer plugins
//!
//! One importer per upstream resource type, resolved by string key through
//! [`ImporterRegistry`]. Each importer knows its own endpoint paths and id
//! shape; the synchronization runner drives them only through the
//! [`Importer`] trait.

pub mod agendas;
pub mod bills;
pub mod calendars;

use crate::client::OpenlegClient;
use crate::db::documents;
use crate::error::{ImportError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub use agendas::AgendaImporter;
pub use bills::BillImporter;
pub use calendars::CalendarImporter;

/// Outcome of a single record within an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Fetched and written to the local store
    Imported,
    /// Fetched but identical to the stored payload
    Skipped,
    /// Fetch or store failed; the run continues
    Failed,
}

/// Per-id outcomes of one importer call
///
/// Record-level failures live here, not in the command error path: a run is
/// successful at the command level even when individual records failed.
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    outcomes: BTreeMap<String, ImportOutcome>,
}

impl ImportResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for one id, overwriting any earlier outcome
    pub fn record(&mut self, id: impl Into<String>, outcome: ImportOutcome) {
        self.outcomes.insert(id.into(), outcome);
    }

    pub fn imported(&self) -> usize {
        self.count(ImportOutcome::Imported)
    }

    pub fn skipped(&self) -> usize {
        self.count(ImportOutcome::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(ImportOutcome::Failed)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterate outcomes in id order
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, ImportOutcome)> {
        self.outcomes.iter().map(|(id, o)| (id.as_str(), *o))
    }

    fn count(&self, outcome: ImportOutcome) -> usize {
        self.outcomes.values().filter(|o| **o == outcome).count()
    }
}

/// A type-specific importer plugin
#[async_trait]
pub trait Importer: Send + Sync {
    /// Resource type string this importer serves
    fn resource(&self) -> &'static str;

    /// Pull all upstream records changed in `[from, to)` and upsert the
    /// corresponding local documents
    async fn import_updates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ImportResult>;

    /// Pull and upsert a specific enumerated set of upstream records
    async fn import(&self, ids: &[String]) -> Result<ImportResult>;

    /// One page of an upstream session search, reduced to candidate ids
    ///
    /// `offset` is 1-based; `limit == 0` leaves the page size to the
    /// upstream default. The runner unions the returned ids with any
    /// explicitly supplied ids before calling [`Importer::import`].
    async fn ids_from_session(
        &self,
        session: i32,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<String>>;
}

/// Registry of importers keyed by resource type
pub struct ImporterRegistry {
    importers: HashMap<String, Arc<dyn Importer>>,
}

impl ImporterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            importers: HashMap::new(),
        }
    }

    /// Registry with the stock importers wired over a shared client and pool
    pub fn with_defaults(client: Arc<OpenlegClient>, db: SqlitePool) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(BillImporter::new(client.clone(), db.clone())));
        registry.register(Arc::new(AgendaImporter::new(client.clone(), db.clone())));
        registry.register(Arc::new(CalendarImporter::new(client, db)));
        registry
    }

    /// Register an importer under its resource type
    pub fn register(&mut self, importer: Arc<dyn Importer>) {
        self.importers
            .insert(importer.resource().to_string(), importer);
    }

    /// Resolve an importer by resource type
    pub fn get(&self, resource: &str) -> Result<Arc<dyn Importer>> {
        self.importers
            .get(resource)
            .cloned()
            .ok_or_else(|| ImportError::UnknownType(resource.to_string()))
    }

    /// Registered resource types, sorted
    pub fn resources(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.importers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch one record and upsert it into the local store
///
/// Shared by the concrete importers. Failures are absorbed into the
/// returned outcome; an unchanged payload counts as skipped.
pub(crate) async fn fetch_and_store(
    client: &OpenlegClient,
    db: &SqlitePool,
    resource: &str,
    id: &str,
) -> ImportOutcome {
    let payload = match client.document(resource, id).await {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(resource, id, error = %err, "failed to fetch document");
            return ImportOutcome::Failed;
        }
    };

    match documents::get_document(db, resource, id).await {
        Ok(Some(existing)) if existing == payload => return ImportOutcome::Skipped,
        Ok(_) => {}
        Err(err) => {
            tracing::warn!(resource, id, error = %err, "failed to read stored document");
            return ImportOutcome::Failed;
        }
    }

    match documents::save_document(db, resource, id, &payload).await {
        Ok(()) => ImportOutcome::Imported,
        Err(err) => {
            tracing::warn!(resource, id, error = %err, "failed to store document");
            ImportOutcome::Failed
        }
    }
}
