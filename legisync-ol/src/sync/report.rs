//! Result reporting
//!
//! One structured log record per outcome category. Reporting never fails;
//! per-record failures surface here and nowhere else.

use crate::importers::ImportResult;
use tracing::{info, warn};

/// Report the outcome counts of one importer call
pub fn report(resource: &str, result: &ImportResult) {
    info!(resource, count = result.imported(), "records imported");
    info!(resource, count = result.skipped(), "records skipped");

    if result.failed() > 0 {
        warn!(resource, count = result.failed(), "records failed");
    } else {
        info!(resource, count = 0u32, "records failed");
    }
}
