//! legisync-ol - OpenLeg import commands
//!
//! Batch synchronization of a local document store against the NY Senate
//! Open Legislation API. Designed to run from cron: `import-updates` pulls
//! everything changed since the last successful run; `import` pulls an
//! explicit set of records for backfills and repairs.
//!
//! Exit codes: 0 success (including runs with per-record failures),
//! 1 framework error (lock held without --force, upstream or database
//! failure), 2 unknown resource type.

use clap::Parser;
use legisync_common::config::TomlConfig;
use legisync_common::db::state::{SqliteStateStore, StateStore};
use legisync_common::time::parse_time;
use legisync_ol::cli::{Args, Command};
use legisync_ol::client::OpenlegClient;
use legisync_ol::importers::ImporterRegistry;
use legisync_ol::sync::SyncRunner;
use legisync_ol::{ImportError, Result, STATE_NAMESPACE};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match TomlConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            // Tracing is not up yet; config errors go straight to stderr
            eprintln!("legisync-ol: {}", err);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging.level);

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match &err {
                ImportError::Locked { resource, since } => {
                    error!(
                        resource = %resource,
                        held_since = %since,
                        "an import is already running; pass --force to override"
                    );
                }
                other => error!(error = %other, "import failed"),
            }
            ExitCode::from(err.exit_code())
        }
    }
}

/// Initialize tracing; RUST_LOG wins over the configured level
fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("legisync_ol={level},legisync_common={level}"))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run(args: Args, config: TomlConfig) -> Result<()> {
    info!("legisync-ol {} starting", env!("CARGO_PKG_VERSION"));

    let db_path = config.resolve_database_path(args.database.as_deref());
    info!(database = %db_path.display(), "opening database");
    let pool = legisync_ol::db::init_database_pool(&db_path).await?;

    let client = Arc::new(OpenlegClient::new(&config.api));
    let registry = ImporterRegistry::with_defaults(client, pool.clone());
    let store: Arc<dyn StateStore> = Arc::new(SqliteStateStore::new(pool, STATE_NAMESPACE));
    let runner = SyncRunner::new(registry, store);

    match args.command {
        Command::ImportUpdates {
            resource,
            from,
            to,
            force,
        } => {
            let from = from.as_deref().map(parse_time).transpose()?;
            let to = to.as_deref().map(parse_time).transpose()?;
            runner.run_updates(&resource, from, to, force).await?;
        }
        Command::Import {
            resource,
            ids,
            session,
            limit,
            offset,
            force,
        } => {
            runner
                .run_import(&resource, &ids, session, limit, offset, force)
                .await?;
        }
    }

    Ok(())
}
