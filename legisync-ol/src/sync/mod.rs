//! Update synchronization core
//!
//! One invocation runs the pipeline
//! `resolve importer -> acquire lock -> run importer -> report ->
//! persist watermark -> release lock`.
//! The lock manager and window resolver read and write the injected
//! [`StateStore`](legisync_common::db::state::StateStore); each resource
//! type's state is independent of every other type's.

pub mod lock;
pub mod report;
pub mod runner;
pub mod window;

pub use lock::LockManager;
pub use report::report;
pub use runner::SyncRunner;
pub use window::{normalize_ids, resolve_window, Window};
