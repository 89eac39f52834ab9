// src/dispatch.rs

//! Checksum-verified publish of postings to the dispatch queue.
//!
//! The dispatched flag is only recorded after the queue's body digest
//! matches the locally computed one. A mismatched or failed publish leaves
//! the flag untouched, so the crawler's retry path re-publishes the
//! posting on its next pass instead of silently dropping it.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::Posting;
use crate::queue::{DispatchQueue, body_checksum};
use crate::store::DedupStore;

/// Publishes postings and records the dispatch in the dedup store.
pub struct Dispatcher {
    store: Arc<dyn DedupStore>,
    queue: Arc<dyn DispatchQueue>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn DedupStore>, queue: Arc<dyn DispatchQueue>) -> Self {
        Self { store, queue }
    }

    /// Serialize, publish, verify transport integrity, and flip the
    /// dispatched flag.
    ///
    /// Returns `Ok(true)` when the posting was published with a verified
    /// checksum, `Ok(false)` when the queue's digest disagreed with ours.
    pub async fn dispatch(&self, posting: &Posting) -> Result<bool> {
        if !posting.has_description() {
            return Err(AppError::validation(format!(
                "posting {} has no description, refusing to dispatch",
                posting.id
            )));
        }

        let body = serde_json::to_string(posting)?;
        let expected = body_checksum(&body);
        let reported = self.queue.publish(&body).await?;

        if reported != expected {
            log::warn!(
                "Body digest mismatch for posting {}: sent {expected}, queue reported {reported}; \
                 leaving undispatched for retry",
                posting.id
            );
            return Ok(false);
        }

        // The message is already durable in the queue at this point, so a
        // failed flag update degrades to a possible duplicate dispatch on
        // the next pass, never a lost posting.
        if let Err(error) = self.store.mark_dispatched(&posting.id).await {
            log::warn!(
                "Posting {} published but flag update failed: {error}",
                posting.id
            );
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::queue::{MemoryQueue, QueueMessage};
    use crate::store::MemoryStore;

    fn posting(id: &str, description: &str) -> Posting {
        Posting {
            id: id.to_string(),
            title: "t".to_string(),
            company: "c".to_string(),
            location: "l".to_string(),
            published_at: String::new(),
            description: description.to_string(),
            dispatched: false,
            expires_at: 0,
        }
    }

    /// Queue that accepts the message but reports a bogus digest.
    struct CorruptingQueue;

    #[async_trait]
    impl DispatchQueue for CorruptingQueue {
        async fn publish(&self, _body: &str) -> Result<String> {
            Ok("not-a-real-digest".to_string())
        }

        async fn receive(&self, _max: usize) -> Result<Vec<QueueMessage>> {
            Ok(Vec::new())
        }

        async fn delete(&self, _handle: &str) -> Result<()> {
            Ok(())
        }
    }

    /// Queue that is unreachable.
    struct FailingQueue;

    #[async_trait]
    impl DispatchQueue for FailingQueue {
        async fn publish(&self, _body: &str) -> Result<String> {
            Err(AppError::publish("queue unreachable"))
        }

        async fn receive(&self, _max: usize) -> Result<Vec<QueueMessage>> {
            Ok(Vec::new())
        }

        async fn delete(&self, _handle: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_verified_publish_marks_dispatched() {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new(Duration::from_secs(30), 3));
        let dispatcher = Dispatcher::new(store.clone(), queue.clone());

        let posting = posting("1", "a description");
        store.insert(&posting).await.unwrap();

        assert!(dispatcher.dispatch(&posting).await.unwrap());
        assert!(store.lookup("1").await.unwrap().unwrap().dispatched);
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_published_body_roundtrips() {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new(Duration::from_secs(30), 3));
        let dispatcher = Dispatcher::new(store.clone(), queue.clone());

        let posting = posting("1", "a description");
        dispatcher.dispatch(&posting).await.unwrap();

        let batch = queue.receive(1).await.unwrap();
        let decoded: Posting = serde_json::from_str(&batch[0].body).unwrap();
        assert_eq!(decoded.id, "1");
        assert_eq!(decoded.description, "a description");
    }

    #[tokio::test]
    async fn test_checksum_mismatch_leaves_flag_untouched() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(CorruptingQueue));

        let posting = posting("1", "a description");
        store.insert(&posting).await.unwrap();

        assert!(!dispatcher.dispatch(&posting).await.unwrap());
        assert!(!store.lookup("1").await.unwrap().unwrap().dispatched);
    }

    #[tokio::test]
    async fn test_publish_failure_leaves_flag_untouched() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(FailingQueue));

        let posting = posting("1", "a description");
        store.insert(&posting).await.unwrap();

        assert!(dispatcher.dispatch(&posting).await.is_err());
        assert!(!store.lookup("1").await.unwrap().unwrap().dispatched);
    }

    #[tokio::test]
    async fn test_empty_description_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new(Duration::from_secs(30), 3));
        let dispatcher = Dispatcher::new(store, queue.clone());

        let posting = posting("1", "");
        assert!(dispatcher.dispatch(&posting).await.is_err());
        assert!(queue.is_empty());
    }
}
