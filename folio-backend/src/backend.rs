use std::sync::Arc;

use async_trait::async_trait;
use folio_core::{ChapterKey, KeyScope, Raw};

use crate::BackendError;

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Outcome of a remove operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// The given number of records were removed.
    Deleted(u32),
    /// No record existed under the key.
    Missing,
}

/// A persistent key-value substrate holding serialized chapter records.
///
/// Values are opaque [`Raw`] bytes — the cache facade owns the record
/// format. Implementations must serialize conflicting writes to the same
/// key internally. The cache's eviction sequence (scan a collection,
/// remove the oldest, insert) is *not* atomic across keys; that is
/// acceptable for a single-session client store, and a multi-writer host
/// must wrap the sequence in its own transaction or single-writer queue.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Reads the record stored under `key`.
    async fn read(&self, key: &ChapterKey) -> BackendResult<Option<Raw>>;

    /// Stores `value` under `key`, replacing any previous record.
    async fn write(&self, key: &ChapterKey, value: Raw) -> BackendResult<()>;

    /// Removes the record under `key`. Absence is not an error.
    async fn remove(&self, key: &ChapterKey) -> BackendResult<DeleteStatus>;

    /// Returns every `(key, value)` pair inside `scope`.
    ///
    /// A `Book` scope must cost O(collection size) on an ordered store;
    /// `User` and `All` scopes are maintenance paths and may scan wider.
    async fn scan(&self, scope: &KeyScope) -> BackendResult<Vec<(ChapterKey, Raw)>>;

    /// Returns the name of this backend for log attribution.
    fn name(&self) -> &str {
        "backend"
    }
}

#[async_trait]
impl Backend for &dyn Backend {
    async fn read(&self, key: &ChapterKey) -> BackendResult<Option<Raw>> {
        (*self).read(key).await
    }

    async fn write(&self, key: &ChapterKey, value: Raw) -> BackendResult<()> {
        (*self).write(key, value).await
    }

    async fn remove(&self, key: &ChapterKey) -> BackendResult<DeleteStatus> {
        (*self).remove(key).await
    }

    async fn scan(&self, scope: &KeyScope) -> BackendResult<Vec<(ChapterKey, Raw)>> {
        (*self).scan(scope).await
    }

    fn name(&self) -> &str {
        (*self).name()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn read(&self, key: &ChapterKey) -> BackendResult<Option<Raw>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &ChapterKey, value: Raw) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &ChapterKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn scan(&self, scope: &KeyScope) -> BackendResult<Vec<(ChapterKey, Raw)>> {
        (**self).scan(scope).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend + Send + 'static> {
    async fn read(&self, key: &ChapterKey) -> BackendResult<Option<Raw>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &ChapterKey, value: Raw) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &ChapterKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn scan(&self, scope: &KeyScope) -> BackendResult<Vec<(ChapterKey, Raw)>> {
        (**self).scan(scope).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
