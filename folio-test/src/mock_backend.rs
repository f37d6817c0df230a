use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use folio_backend::{Backend, BackendError, BackendResult, DeleteStatus};
use folio_core::{ChapterKey, KeyScope, Raw};

#[derive(Debug, Default)]
pub struct BackendCounters {
    pub read_count: AtomicUsize,
    pub write_count: AtomicUsize,
    pub remove_count: AtomicUsize,
    pub scan_count: AtomicUsize,
}

#[derive(Debug, Default)]
struct FaultFlags {
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_removes: AtomicBool,
    fail_scans: AtomicBool,
}

/// Counting mock substrate with per-operation fault injection.
///
/// Used to verify both the cache's bookkeeping (how many backend calls an
/// operation makes) and its degrade-to-default behavior when the substrate
/// misbehaves.
#[derive(Clone, Debug, Default)]
pub struct MockBackend {
    pub store: Arc<DashMap<ChapterKey, Raw>>,
    counters: Arc<BackendCounters>,
    faults: Arc<FaultFlags>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_count(&self) -> usize {
        self.counters.read_count.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.counters.write_count.load(Ordering::SeqCst)
    }

    pub fn remove_count(&self) -> usize {
        self.counters.remove_count.load(Ordering::SeqCst)
    }

    pub fn scan_count(&self) -> usize {
        self.counters.scan_count.load(Ordering::SeqCst)
    }

    pub fn entry_count(&self) -> usize {
        self.store.len()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.faults.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.faults.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removes(&self, fail: bool) {
        self.faults.fail_removes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_scans(&self, fail: bool) {
        self.faults.fail_scans.store(fail, Ordering::SeqCst);
    }

    fn fault(operation: &str) -> BackendError {
        BackendError::InternalError(Box::new(std::io::Error::other(format!(
            "injected {operation} fault"
        ))))
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn read(&self, key: &ChapterKey) -> BackendResult<Option<Raw>> {
        self.counters.read_count.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::fault("read"));
        }
        Ok(self.store.get(key).map(|entry| entry.value().clone()))
    }

    async fn write(&self, key: &ChapterKey, value: Raw) -> BackendResult<()> {
        self.counters.write_count.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::fault("write"));
        }
        self.store.insert(key.clone(), value);
        Ok(())
    }

    async fn remove(&self, key: &ChapterKey) -> BackendResult<DeleteStatus> {
        self.counters.remove_count.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_removes.load(Ordering::SeqCst) {
            return Err(Self::fault("remove"));
        }
        match self.store.remove(key) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn scan(&self, scope: &KeyScope) -> BackendResult<Vec<(ChapterKey, Raw)>> {
        self.counters.scan_count.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_scans.load(Ordering::SeqCst) {
            return Err(Self::fault("scan"));
        }
        Ok(self
            .store
            .iter()
            .filter(|entry| scope.matches(entry.key()))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
