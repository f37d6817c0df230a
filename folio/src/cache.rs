use chrono::{DateTime, Utc};
use folio_backend::{Backend, DeleteStatus};
use folio_core::{
    ChapterKey, ChapterPayload, ChapterRecord, Description, GeneratedImage, KeyScope, Raw,
    is_expired, merge_images,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::stats::CacheStats;

/// Per-user offline store of fetched chapter content.
///
/// Reads treat records older than the configured TTL as absent and delete
/// them on detection; writes enforce the per-book record ceiling by
/// evicting the least-recently-accessed records first. Storage trouble is
/// caught at every operation boundary, logged, and converted to a safe
/// default — cache unavailability must never block the reading path.
///
/// Cloning is cheap when the backend clones cheaply; clones share the
/// same store.
#[derive(Clone, Debug)]
pub struct ChapterCache<B> {
    backend: B,
    config: CacheConfig,
}

/// Counts removed by one [`ChapterCache::perform_maintenance`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    /// Records removed by the legacy-schema sweep.
    pub legacy_removed: u64,
    /// Records removed by the TTL sweep.
    pub expired_removed: u64,
    /// Records removed by the empty-description sweep.
    pub empty_removed: u64,
}

impl MaintenanceReport {
    /// Total records removed across all three sweeps.
    pub fn total(&self) -> u64 {
        self.legacy_removed + self.expired_removed + self.empty_removed
    }
}

impl<B> ChapterCache<B>
where
    B: Backend + Clone + 'static,
{
    /// Creates a cache over `backend` with the default configuration.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, CacheConfig::default())
    }

    /// Creates a cache over `backend` with an explicit configuration.
    pub fn with_config(backend: B, config: CacheConfig) -> Self {
        ChapterCache { backend, config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns true if a live (non-expired) record exists for the chapter.
    ///
    /// Detecting an expired record schedules its deletion on a background
    /// task; the returned boolean reflects the expiry check synchronously.
    /// Does not bump recency.
    pub async fn has(&self, user: &str, book: &str, chapter: u32) -> bool {
        let key = ChapterKey::new(user, book, chapter);
        match self.try_has(&key).await {
            Ok(present) => present,
            Err(error) => {
                self.degraded(&error, "has");
                false
            }
        }
    }

    /// Returns the cached payload for the chapter, or `None` on absence or
    /// expiry.
    ///
    /// An expired record is deleted before `None` is returned. On a hit,
    /// `last_accessed_at` is bumped and written back before the payload is
    /// returned, so the bump is visible to later eviction decisions.
    pub async fn get(&self, user: &str, book: &str, chapter: u32) -> Option<ChapterPayload> {
        let key = ChapterKey::new(user, book, chapter);
        match self.try_get(&key).await {
            Ok(payload) => payload,
            Err(error) => {
                self.degraded(&error, "get");
                None
            }
        }
    }

    /// Stores fetched chapter content, associating each generated image
    /// with the description it was rendered for.
    ///
    /// If the `(user, book)` collection is at its ceiling, enough of its
    /// least-recently-accessed records are evicted first to admit the new
    /// one; overwriting an already-cached chapter never evicts. Returns
    /// false on any storage fault — the caller treats failure as "not
    /// cached", not as an error.
    pub async fn set(
        &self,
        user: &str,
        book: &str,
        chapter: u32,
        descriptions: Vec<Description>,
        images: Vec<GeneratedImage>,
    ) -> bool {
        let key = ChapterKey::new(user, book, chapter);
        match self.try_set(&key, descriptions, images).await {
            Ok(()) => true,
            Err(error) => {
                self.degraded(&error, "set");
                false
            }
        }
    }

    /// Removes the chapter's record. Idempotent — absence is not an error.
    ///
    /// Returns false only on a storage fault.
    pub async fn delete(&self, user: &str, book: &str, chapter: u32) -> bool {
        let key = ChapterKey::new(user, book, chapter);
        match self.backend.remove(&key).await {
            Ok(_) => true,
            Err(error) => {
                self.degraded(&CacheError::from(error), "delete");
                false
            }
        }
    }

    /// Removes every record of the `(user, book)` collection.
    ///
    /// Returns the number removed (0 on fault).
    pub async fn clear_book(&self, user: &str, book: &str) -> u64 {
        self.clear_scope(KeyScope::book(user, book), "clear_book").await
    }

    /// Removes every record owned by `user`, across all books.
    ///
    /// Returns the number removed (0 on fault).
    pub async fn clear_all(&self, user: &str) -> u64 {
        self.clear_scope(KeyScope::user(user), "clear_all").await
    }

    /// Sweeps the whole store and removes records whose `last_accessed_at`
    /// is older than the TTL.
    ///
    /// The bulk counterpart to the lazy per-read check: it reclaims space
    /// for records nobody has read recently (and thus never triggered lazy
    /// expiry). Returns the number removed (0 on fault).
    pub async fn clear_expired(&self) -> u64 {
        let now = Utc::now();
        let ttl = self.config.ttl();
        self.sweep(
            move |record| record.is_some_and(|r| is_expired(r.last_accessed_at, now, ttl)),
            "clear_expired",
        )
        .await
    }

    /// Removes records whose description list is empty — placeholders left
    /// by an earlier schema that stored rows without content.
    ///
    /// Returns the number removed (0 on fault).
    pub async fn clear_empty_descriptions(&self) -> u64 {
        self.sweep(
            |record| record.is_some_and(|r| r.descriptions.is_empty()),
            "clear_empty_descriptions",
        )
        .await
    }

    /// Removes records written before per-user isolation existed (missing
    /// user id), along with records that no longer decode at all.
    ///
    /// Returns the number removed (0 on fault).
    pub async fn clear_legacy_data(&self) -> u64 {
        self.sweep(
            |record| record.is_none_or(|r| r.is_legacy()),
            "clear_legacy_data",
        )
        .await
    }

    /// Full-scan aggregate over the physical record set.
    ///
    /// Expired-but-unswept records are counted — stats report physical
    /// state, not logical liveness. Returns empty stats on fault.
    pub async fn stats(&self) -> CacheStats {
        match self.try_stats().await {
            Ok(stats) => stats,
            Err(error) => {
                self.degraded(&error, "stats");
                CacheStats::default()
            }
        }
    }

    /// Runs the legacy, TTL, and empty-description sweeps, in that order.
    ///
    /// Intended to run once per session start, not on a timer.
    pub async fn perform_maintenance(&self) -> MaintenanceReport {
        let report = MaintenanceReport {
            legacy_removed: self.clear_legacy_data().await,
            expired_removed: self.clear_expired().await,
            empty_removed: self.clear_empty_descriptions().await,
        };
        info!(
            backend = self.backend.name(),
            legacy = report.legacy_removed,
            expired = report.expired_removed,
            empty = report.empty_removed,
            "chapter cache maintenance finished"
        );
        report
    }

    async fn try_has(&self, key: &ChapterKey) -> Result<bool, CacheError> {
        let Some(raw) = self.backend.read(key).await? else {
            return Ok(false);
        };
        let Some(record) = self.decode(key, &raw) else {
            return Ok(false);
        };
        if is_expired(record.cached_at, Utc::now(), self.config.ttl()) {
            self.spawn_remove(key.clone());
            return Ok(false);
        }
        Ok(true)
    }

    async fn try_get(&self, key: &ChapterKey) -> Result<Option<ChapterPayload>, CacheError> {
        let Some(raw) = self.backend.read(key).await? else {
            return Ok(None);
        };
        let Some(mut record) = self.decode(key, &raw) else {
            return Ok(None);
        };
        let now = Utc::now();
        if is_expired(record.cached_at, now, self.config.ttl()) {
            debug!(key = %key, cached_at = %record.cached_at, "dropping expired chapter record");
            self.backend.remove(key).await?;
            return Ok(None);
        }
        record.touch(now);
        self.backend.write(key, encode(&record)?).await?;
        Ok(Some(record.into_payload()))
    }

    async fn try_set(
        &self,
        key: &ChapterKey,
        descriptions: Vec<Description>,
        images: Vec<GeneratedImage>,
    ) -> Result<(), CacheError> {
        let descriptions = merge_images(descriptions, images);
        self.evict_for(key).await?;
        let record = ChapterRecord::new(key, descriptions, Utc::now());
        self.backend.write(key, encode(&record)?).await?;
        Ok(())
    }

    /// Makes room in the target collection before an insert.
    ///
    /// Evict-then-insert: if the collection holds `ceiling` or more
    /// records, the oldest by `last_accessed_at` go first until the new
    /// record fits under the ceiling. Records that no longer decode sort
    /// oldest, so schema leftovers are reclaimed before live data.
    async fn evict_for(&self, key: &ChapterKey) -> Result<(), CacheError> {
        let scope = KeyScope::Book(key.book_key());
        let pairs = self.backend.scan(&scope).await?;
        // Overwriting an existing chapter never changes the record count.
        if pairs.iter().any(|(existing, _)| existing == key) {
            return Ok(());
        }
        let ceiling = self.config.max_records_per_book();
        if pairs.len() < ceiling {
            return Ok(());
        }

        let mut candidates: Vec<(ChapterKey, DateTime<Utc>)> = pairs
            .into_iter()
            .map(|(candidate, raw)| {
                let last_accessed = self
                    .decode(&candidate, &raw)
                    .map(|record| record.last_accessed_at)
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                (candidate, last_accessed)
            })
            .collect();
        candidates.sort_by_key(|(_, last_accessed)| *last_accessed);

        let excess = candidates.len() - ceiling + 1;
        for (victim, _) in candidates.into_iter().take(excess) {
            debug!(key = %victim, "evicting least recently accessed chapter");
            self.backend.remove(&victim).await?;
        }
        Ok(())
    }

    async fn clear_scope(&self, scope: KeyScope, operation: &'static str) -> u64 {
        match self.try_clear_scope(&scope).await {
            Ok(removed) => removed,
            Err(error) => {
                self.degraded(&error, operation);
                0
            }
        }
    }

    async fn try_clear_scope(&self, scope: &KeyScope) -> Result<u64, CacheError> {
        let mut removed = 0u64;
        for (key, _) in self.backend.scan(scope).await? {
            if let DeleteStatus::Deleted(count) = self.backend.remove(&key).await? {
                removed += u64::from(count);
            }
        }
        Ok(removed)
    }

    /// Store-wide sweep removing every record the predicate selects.
    ///
    /// The predicate sees `None` for records that failed to decode.
    async fn sweep<F>(&self, should_remove: F, operation: &'static str) -> u64
    where
        F: Fn(Option<&ChapterRecord>) -> bool,
    {
        match self.try_sweep(should_remove).await {
            Ok(removed) => removed,
            Err(error) => {
                self.degraded(&error, operation);
                0
            }
        }
    }

    async fn try_sweep<F>(&self, should_remove: F) -> Result<u64, CacheError>
    where
        F: Fn(Option<&ChapterRecord>) -> bool,
    {
        let mut removed = 0u64;
        for (key, raw) in self.backend.scan(&KeyScope::All).await? {
            let record = serde_json::from_slice::<ChapterRecord>(&raw).ok();
            if !should_remove(record.as_ref()) {
                continue;
            }
            if let DeleteStatus::Deleted(count) = self.backend.remove(&key).await? {
                removed += u64::from(count);
            }
        }
        Ok(removed)
    }

    async fn try_stats(&self) -> Result<CacheStats, CacheError> {
        let pairs = self.backend.scan(&KeyScope::All).await?;
        let mut stats = CacheStats {
            total_records: pairs.len() as u64,
            ..CacheStats::default()
        };
        for (_, raw) in &pairs {
            if let Ok(record) = serde_json::from_slice::<ChapterRecord>(raw) {
                stats.observe(record.book_id, record.cached_at);
            }
        }
        Ok(stats)
    }

    /// Decodes a stored record, treating undecodable data as absent.
    ///
    /// The legacy maintenance sweep is what physically removes such
    /// records; the read path only reports the miss.
    fn decode(&self, key: &ChapterKey, raw: &Raw) -> Option<ChapterRecord> {
        match serde_json::from_slice(raw) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(
                    backend = self.backend.name(),
                    key = %key,
                    error = %error,
                    "undecodable chapter record treated as absent"
                );
                None
            }
        }
    }

    fn spawn_remove(&self, key: ChapterKey) {
        let backend = self.backend.clone();
        tokio::spawn(async move {
            if let Err(error) = backend.remove(&key).await {
                warn!(key = %key, error = %error, "failed to drop expired chapter record");
            }
        });
    }

    fn degraded(&self, error: &CacheError, operation: &'static str) {
        warn!(
            backend = self.backend.name(),
            operation,
            error = %error,
            "chapter cache degraded to default"
        );
    }
}

fn encode(record: &ChapterRecord) -> Result<Raw, CacheError> {
    Ok(Raw::from(serde_json::to_vec(record)?))
}
