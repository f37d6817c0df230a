use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use folio_backend::{Backend, BackendResult, DeleteStatus};
use folio_core::{ChapterKey, KeyScope, Raw};
use tokio::sync::RwLock;

/// In-process chapter store over an ordered map.
///
/// Keys order by `(user, book, chapter)`, so a `Book`-scoped scan is one
/// contiguous range rather than a full-store filter. Conflicting writes
/// serialize on the store lock.
///
/// Cloning is cheap — clones share the same underlying map.
///
/// ```
/// use folio_memory::MemoryBackend;
///
/// let backend = MemoryBackend::new();
/// let session_copy = backend.clone(); // same store
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    store: Arc<RwLock<BTreeMap<ChapterKey, Raw>>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// True if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn read(&self, key: &ChapterKey) -> BackendResult<Option<Raw>> {
        Ok(self.store.read().await.get(key).cloned())
    }

    async fn write(&self, key: &ChapterKey, value: Raw) -> BackendResult<()> {
        self.store.write().await.insert(key.clone(), value);
        Ok(())
    }

    async fn remove(&self, key: &ChapterKey) -> BackendResult<DeleteStatus> {
        match self.store.write().await.remove(key) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn scan(&self, scope: &KeyScope) -> BackendResult<Vec<(ChapterKey, Raw)>> {
        let store = self.store.read().await;
        let pairs = match scope {
            // One contiguous range: every chapter of the collection.
            KeyScope::Book(book) => store
                .range((
                    Bound::Included(book.chapter(0)),
                    Bound::Included(book.chapter(u32::MAX)),
                ))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            _ => store
                .iter()
                .filter(|(key, _)| scope.matches(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        };
        Ok(pairs)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
