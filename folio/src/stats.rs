use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use smol_str::SmolStr;

/// Aggregate view of the stored record set.
///
/// Stats report *physical* state: every stored record counts toward
/// `total_records`, including records that are expired but not yet swept
/// and records an older schema left undecodable. Per-book counts and the
/// age bounds come from the decodable subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Every record physically present in the store.
    pub total_records: u64,
    /// Decodable records grouped by book id.
    pub records_by_book: HashMap<SmolStr, u64>,
    /// Earliest `cached_at` among decodable records.
    pub oldest_cached_at: Option<DateTime<Utc>>,
    /// Latest `cached_at` among decodable records.
    pub newest_cached_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    /// Records the given book/timestamp pair into the aggregates.
    pub(crate) fn observe(&mut self, book_id: SmolStr, cached_at: DateTime<Utc>) {
        *self.records_by_book.entry(book_id).or_insert(0) += 1;
        self.oldest_cached_at = Some(match self.oldest_cached_at {
            Some(oldest) => oldest.min(cached_at),
            None => cached_at,
        });
        self.newest_cached_at = Some(match self.newest_cached_at {
            Some(newest) => newest.max(cached_at),
            None => cached_at,
        });
    }
}
