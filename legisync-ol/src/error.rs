//! Error types for the OpenLeg import commands

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for import operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors that terminate an import invocation
///
/// Per-record failures are not errors; they are absorbed into the
/// [`ImportResult`](crate::importers::ImportResult) and surfaced by the
/// reporter.
#[derive(Error, Debug)]
pub enum ImportError {
    /// No importer registered for the requested resource type
    #[error("no importer registered for resource type '{0}'")]
    UnknownType(String),

    /// Another run holds the advisory lock and --force was not given
    #[error("{resource} import is locked (held since {since})")]
    Locked {
        resource: String,
        since: DateTime<Utc>,
    },

    /// Transport-level upstream failure (wraps reqwest::Error)
    #[error("upstream request failed: {0}")]
    Api(#[from] reqwest::Error),

    /// Upstream responded but reported failure
    #[error("upstream returned failure for {url}: {message}")]
    Upstream { url: String, message: String },

    /// Upstream response did not match the expected shape
    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Database operation error (wraps sqlx::Error)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Shared library error (config, state store, time parsing)
    #[error(transparent)]
    Common(#[from] legisync_common::Error),

    /// Invalid user input
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ImportError {
    /// Process exit code for the CLI boundary
    ///
    /// - `2`: command failed outright (unknown resource type)
    /// - `1`: everything else, including a held lock without --force
    pub fn exit_code(&self) -> u8 {
        match self {
            ImportError::UnknownType(_) => 2,
            _ => 1,
        }
    }
}
