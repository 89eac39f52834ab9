// src/storage/mod.rs

//! Object storage for archived postings.
//!
//! Preprocessed (and downstream-labeled) postings are archived as JSON
//! documents under `{prefix}/{title}-{timestamp}.json`.

pub mod local;
pub mod memory;

#[cfg(feature = "aws")]
pub mod s3;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

// Re-export for convenience
pub use local::PostingLog;
pub use memory::MemoryObjectStore;

#[cfg(feature = "aws")]
pub use s3::S3ObjectStore;

/// Write-only object store for archived documents.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write a JSON document under the given key.
    async fn write_json(&self, key: &str, body: &str) -> Result<()>;
}

/// Archive key for a posting processed at the given instant.
pub fn archive_key(prefix: &str, title: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}/{}-{}.json",
        prefix.trim_end_matches('/'),
        title,
        at.format("%Y-%m-%d-%H:%M:%S")
    )
}
