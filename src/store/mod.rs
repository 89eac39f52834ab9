// src/store/mod.rs

//! Dedup store abstractions.
//!
//! The store is the source of truth for "already seen" and "already
//! dispatched". Records are keyed by posting id, mutated only to flip the
//! dispatched flag, and never deleted explicitly; expiry is the store's
//! job via the `expires_at` attribute.

pub mod memory;

#[cfg(feature = "aws")]
pub mod dynamo;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Posting;

// Re-export for convenience
pub use memory::MemoryStore;

#[cfg(feature = "aws")]
pub use dynamo::DynamoStore;

/// Persistent key-value store of postings keyed by identifier.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Point lookup by posting identifier. Expired records read as absent.
    async fn lookup(&self, id: &str) -> Result<Option<Posting>>;

    /// Unconditional create. Not transactionally guarded against a
    /// concurrent insert for the same id (single-writer deployment).
    async fn insert(&self, posting: &Posting) -> Result<()>;

    /// Idempotent update flipping the dispatched flag to true.
    async fn mark_dispatched(&self, id: &str) -> Result<()>;
}
