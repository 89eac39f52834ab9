// src/store/memory.rs

//! In-memory dedup store for local runs and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::Posting;
use crate::store::DedupStore;

/// HashMap-backed store honoring record expiry on lookup.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Posting>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records, expired ones included.
    pub fn len(&self) -> usize {
        self.records.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DedupStore for MemoryStore {
    async fn lookup(&self, id: &str) -> Result<Option<Posting>> {
        let records = self
            .records
            .lock()
            .map_err(|e| AppError::store(format!("lock poisoned: {e}")))?;

        let now = Utc::now().timestamp();
        Ok(records
            .get(id)
            .filter(|p| p.expires_at == 0 || p.expires_at > now)
            .cloned())
    }

    async fn insert(&self, posting: &Posting) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| AppError::store(format!("lock poisoned: {e}")))?;
        records.insert(posting.id.clone(), posting.clone());
        Ok(())
    }

    async fn mark_dispatched(&self, id: &str) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| AppError::store(format!("lock poisoned: {e}")))?;

        match records.get_mut(id) {
            Some(posting) => posting.dispatched = true,
            None => log::warn!("mark_dispatched: no record for id {id}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(id: &str) -> Posting {
        Posting {
            id: id.to_string(),
            title: "t".to_string(),
            company: "c".to_string(),
            location: "l".to_string(),
            published_at: String::new(),
            description: "d".to_string(),
            dispatched: false,
            expires_at: 0,
        }
    }

    #[tokio::test]
    async fn test_lookup_absent() {
        let store = MemoryStore::new();
        assert!(store.lookup("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_then_lookup() {
        let store = MemoryStore::new();
        store.insert(&posting("1")).await.unwrap();
        let found = store.lookup("1").await.unwrap().unwrap();
        assert_eq!(found.id, "1");
        assert!(!found.dispatched);
    }

    #[tokio::test]
    async fn test_mark_dispatched_is_idempotent() {
        let store = MemoryStore::new();
        store.insert(&posting("1")).await.unwrap();

        store.mark_dispatched("1").await.unwrap();
        store.mark_dispatched("1").await.unwrap();

        assert!(store.lookup("1").await.unwrap().unwrap().dispatched);
    }

    #[tokio::test]
    async fn test_mark_dispatched_absent_is_noop() {
        let store = MemoryStore::new();
        store.mark_dispatched("ghost").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_expired_record_reads_as_absent() {
        let store = MemoryStore::new();
        let mut expired = posting("1");
        expired.expires_at = Utc::now().timestamp() - 60;
        store.insert(&expired).await.unwrap();

        assert!(store.lookup("1").await.unwrap().is_none());
    }
}
