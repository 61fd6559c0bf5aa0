//! Timestamp utilities

use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert unix seconds to a UTC timestamp
///
/// Out-of-range values clamp to the epoch rather than panic; stored state
/// values are operator-visible and may have been edited by hand.
pub fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an operator-supplied time value
///
/// Accepts bare unix seconds (`1672531200`) or RFC 3339
/// (`2023-01-01T00:00:00Z`).
pub fn parse_time(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(secs) = input.parse::<i64>() {
        return Ok(from_unix(secs));
    }

    DateTime::parse_from_rfc3339(input)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::InvalidInput(format!("unrecognized time '{}': {}", input, e)))
}
