//! In-memory profile store for unit testing.
//!
//! This store keeps the collection in process memory and can be told to
//! fail reads or writes, so handlers can be exercised without a filesystem.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::StoreError;

use super::store::ProfileStore;
use super::types::Profile;

/// In-memory store with failure injection.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    profiles: Arc<Mutex<Vec<Profile>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `profiles`.
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        let store = Self::default();
        *store.lock() = profiles;
        store
    }

    /// Make subsequent loads fail with a read error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent saves fail with a write error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current content, bypassing failure injection.
    pub fn snapshot(&self) -> Vec<Profile> {
        self.lock().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Profile>> {
        self.profiles.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn forced(kind: &str) -> std::io::Error {
        std::io::Error::other(format!("forced {kind} failure"))
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Profile>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Read {
                path: PathBuf::from(":memory:"),
                source: Self::forced("read"),
            });
        }
        Ok(self.snapshot())
    }

    async fn save(&self, profiles: &[Profile]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                path: PathBuf::from(":memory:"),
                source: Self::forced("write"),
            });
        }
        *self.lock() = profiles.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
