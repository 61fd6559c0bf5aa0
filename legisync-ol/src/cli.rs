//! Command-line surface for legisync-ol
//!
//! Two subcommands mirror the two sync modes: `import-updates` pulls
//! everything changed in a time window; `import` pulls an enumerated set of
//! records by id and/or session search.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for legisync-ol
#[derive(Parser, Debug)]
#[command(name = "legisync-ol")]
#[command(about = "OpenLeg import commands for legisync")]
#[command(version)]
pub struct Args {
    /// Path to bootstrap TOML config file
    #[arg(long, env = "LEGISYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to SQLite database file
    #[arg(long, env = "LEGISYNC_DB")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Incremental sync: pull upstream records changed in a time window
    ImportUpdates {
        /// Resource type (bills, agendas, calendars)
        resource: String,

        /// Window start, RFC 3339 or unix seconds
        ///
        /// Defaults to the stored watermark of the last successful run
        /// (epoch when no run has been recorded).
        #[arg(long)]
        from: Option<String>,

        /// Window end, RFC 3339 or unix seconds
        ///
        /// Defaults to now. Supplying an explicit end marks the run as a
        /// historical backfill: the stored watermark is not advanced.
        #[arg(long)]
        to: Option<String>,

        /// Proceed even if another run holds the lock
        #[arg(long)]
        force: bool,
    },

    /// Explicit sync: pull an enumerated set of upstream records
    Import {
        /// Resource type (bills, agendas, calendars)
        resource: String,

        /// Record ids, comma-delimited and repeatable (e.g. 2021-S123)
        #[arg(long = "ids")]
        ids: Vec<String>,

        /// Legislative session year to search for candidate ids
        #[arg(long)]
        session: Option<i32>,

        /// Session search page size (0 = upstream default)
        #[arg(long)]
        limit: Option<u32>,

        /// Session search page offset, 1-based
        #[arg(long)]
        offset: Option<u32>,

        /// Proceed even if another run holds the lock
        #[arg(long)]
        force: bool,
    },
}
