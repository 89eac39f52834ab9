// src/storage/memory.rs

//! In-memory object store for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::storage::ObjectStore;

/// HashMap-backed object store.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .expect("object store lock poisoned")
            .get(key)
            .cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("object store lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn write_json(&self, key: &str, body: &str) -> Result<()> {
        self.objects
            .lock()
            .map_err(|e| AppError::store(format!("lock poisoned: {e}")))?
            .insert(key.to_string(), body.to_string());
        Ok(())
    }
}
