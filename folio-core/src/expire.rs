//! The shared expiry predicate.
//!
//! Expiry is checked in two places — lazily on every read and eagerly by
//! the bulk maintenance sweep. Both go through [`is_expired`] so the two
//! mechanisms cannot disagree on the boundary.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Returns true if `timestamp` is at least `ttl` older than `now`.
///
/// The boundary is inclusive: a record exactly `ttl` old is dead.
pub fn is_expired(timestamp: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match chrono::Duration::from_std(ttl) {
        Ok(ttl) => now.signed_duration_since(timestamp) >= ttl,
        // A TTL too large for the calendar never expires anything.
        Err(_) => false,
    }
}
