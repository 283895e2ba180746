//! In-memory ledger store for tests and throwaway sessions.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use jobun_core::error::StoreError;
use jobun_core::ledger::{Ledger, LedgerEntry};
use jobun_core::model::LedgerKey;
use jobun_core::traits::LedgerStore;

/// A ledger store with no durability; it also counts flushes so tests can
/// assert the one-save-per-round discipline.
#[derive(Default)]
pub struct MemoryLedgerStore {
    inner: Mutex<Ledger>,
    save_count: AtomicU32,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start pre-seeded, e.g. to simulate an existing ledger document.
    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            inner: Mutex::new(ledger),
            save_count: AtomicU32::new(0),
        }
    }

    /// Number of `save_entry` calls seen so far.
    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::Relaxed)
    }

    /// A copy of the current ledger state.
    pub fn snapshot(&self) -> Ledger {
        self.inner.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn load(&self) -> Result<Ledger, StoreError> {
        Ok(self.inner.lock().unwrap().clone())
    }

    async fn save_entry(&self, key: &LedgerKey, entry: &LedgerEntry) -> Result<(), StoreError> {
        self.save_count.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().unwrap().restore(key, entry.clone());
        Ok(())
    }
}
