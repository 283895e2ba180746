//! Ledger persistence as a single JSON document.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use jobun_core::error::StoreError;
use jobun_core::ledger::{Ledger, LedgerEntry};
use jobun_core::model::LedgerKey;
use jobun_core::traits::LedgerStore;

/// Keeps the whole ledger in one pretty-printed JSON file.
///
/// Each flush folds one entry into the document with a read-modify-write.
/// The engine fires flushes from detached tasks, so writes are serialized
/// through an internal lock to keep them from interleaving on the file.
pub struct JsonLedgerStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_document(&self) -> Result<Ledger, StoreError> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_document(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let parent = self.path.parent().unwrap_or(std::path::Path::new("."));
        std::fs::create_dir_all(parent)?;
        let json = serde_json::to_string_pretty(ledger)?;
        // write-then-rename, so a crash mid-flush never truncates the document
        let tmp = tempfile::NamedTempFile::new_in(parent)?;
        std::fs::write(tmp.path(), json)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for JsonLedgerStore {
    async fn load(&self) -> Result<Ledger, StoreError> {
        self.read_document()
    }

    async fn save_entry(&self, key: &LedgerKey, entry: &LedgerEntry) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut ledger = match self.read_document() {
            Ok(ledger) => ledger,
            Err(e) if e.is_not_found() => Ledger::new(),
            Err(e) => return Err(e),
        };
        ledger.restore(key, entry.clone());
        self.write_document(&ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jobun_core::model::Citation;

    fn entry_with(attempts: u32, correct: u32, score: u64) -> LedgerEntry {
        LedgerEntry {
            attempts,
            correct,
            cumulative_score: score,
            last_attempted_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn missing_document_is_reported_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLedgerStore::new(dir.path().join("ledger.json"));

        let err = store.load().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn first_flush_creates_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLedgerStore::new(dir.path().join("data/ledger.json"));

        let citation = Citation::new("民法", "413-2");
        store
            .save_entry(&citation.ledger_key(), &entry_with(1, 1, 17))
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        let entry = loaded.entry(&citation).unwrap();
        assert_eq!(entry.attempts, 1);
        assert_eq!(entry.cumulative_score, 17);
    }

    #[tokio::test]
    async fn later_flushes_keep_earlier_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLedgerStore::new(dir.path().join("ledger.json"));

        let first = Citation::new("民法", "94");
        let second = Citation::new("刑法", "199");
        store
            .save_entry(&first.ledger_key(), &entry_with(2, 1, 15))
            .await
            .unwrap();
        store
            .save_entry(&second.ledger_key(), &entry_with(1, 0, 0))
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.entry(&first).unwrap().attempts, 2);
        assert_eq!(loaded.entry(&second).unwrap().attempts, 1);
    }

    #[tokio::test]
    async fn reflushing_a_key_overwrites_its_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLedgerStore::new(dir.path().join("ledger.json"));

        let citation = Citation::new("商法", "512");
        store
            .save_entry(&citation.ledger_key(), &entry_with(1, 0, 0))
            .await
            .unwrap();
        store
            .save_entry(&citation.ledger_key(), &entry_with(2, 1, 12))
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        let entry = loaded.entry(&citation).unwrap();
        assert_eq!(entry.attempts, 2);
        assert_eq!(entry.correct, 1);
    }

    #[tokio::test]
    async fn corrupt_document_is_a_parse_error_not_a_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = JsonLedgerStore::new(path);
        let err = store.load().await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(matches!(err, StoreError::Serde(_)));
    }
}
