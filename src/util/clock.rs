//! Wall-clock helpers.

use chrono::{DateTime, Utc};

/// Current UTC time, used for store-assigned creation timestamps.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

