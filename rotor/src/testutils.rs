use crate::catalog::Catalog;
use crate::errors::RotorError;
use crate::store::CursorStore;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory cursor store double that records write traffic and can be
/// switched into failure modes.
#[derive(Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
    set_calls: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn with_value(value: i64) -> Self {
        let store = MemoryStore::default();
        store.put_raw(&value.to_string());
        store
    }

    /// A store whose every call fails, as if the backend were unreachable.
    pub fn failing() -> Self {
        let store = MemoryStore::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Seeds an arbitrary raw value, bypassing the integer contract.
    pub fn put_raw(&self, raw: &str) {
        *self.value.lock().unwrap() = Some(raw.to_string());
    }

    pub fn stored(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CursorStore for MemoryStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, RotorError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RotorError::StoreRequest("connection refused".into()));
        }
        Ok(self.stored())
    }

    async fn set(&self, _key: &str, value: i64) -> Result<(), RotorError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RotorError::StoreRequest("connection refused".into()));
        }
        self.put_raw(&value.to_string());
        Ok(())
    }
}

/// An in-memory catalog with `total` sequentially named agents.
pub fn catalog(total: usize) -> Catalog {
    Catalog {
        updated: "2026-01-15".into(),
        count: total as u64,
        browser_choice: "mix".into(),
        useragents: (1..=total)
            .map(|i| format!("Mozilla/5.0 (agent {i})"))
            .collect(),
    }
}

/// Writes a catalog document with `total` agents to a temp file. The
/// returned directory guard must outlive the path.
pub fn catalog_file(total: usize) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ua.json");
    let doc = serde_json::json!({
        "updated": "2026-01-15",
        "count": total,
        "browser_choice": "mix",
        "useragents": catalog(total).useragents,
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&doc).unwrap()).unwrap();
    (dir, path)
}
