// src/context.rs

//! Shared handles to the external collaborators.
//!
//! Pipeline stages receive their store, queue, and sink through this
//! context instead of module-level singletons, so tests and local runs
//! can substitute in-memory doubles.

use std::sync::Arc;
use std::time::Duration;

use crate::queue::{DispatchQueue, FanoutSink, MemoryQueue, MemorySink};
use crate::storage::ObjectStore;
use crate::store::{DedupStore, MemoryStore};

/// Injected collaborator handles for both pipeline stages.
pub struct AppContext {
    pub store: Arc<dyn DedupStore>,
    pub queue: Arc<dyn DispatchQueue>,
    pub sink: Arc<dyn FanoutSink>,

    /// Optional archive for preprocessed postings.
    pub archive: Option<Arc<dyn ObjectStore>>,
}

impl AppContext {
    /// Context over in-memory collaborators for local dry runs and tests.
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            queue: Arc::new(MemoryQueue::new(Duration::from_secs(30), 3)),
            sink: Arc::new(MemorySink::new()),
            archive: None,
        }
    }

    /// Context over the deployed AWS resources named in configuration.
    #[cfg(feature = "aws")]
    pub async fn from_env(config: &crate::models::Config) -> crate::error::Result<Self> {
        use crate::queue::{SnsSink, SqsQueue};
        use crate::storage::S3ObjectStore;
        use crate::store::DynamoStore;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let resources = &config.resources;

        let store = DynamoStore::new(
            aws_sdk_dynamodb::Client::new(&aws_config),
            resources.table_name(),
        );
        let queue = SqsQueue::from_name(
            aws_sdk_sqs::Client::new(&aws_config),
            &resources.queue_name(),
        )
        .await?;
        let sink = SnsSink::new(aws_sdk_sns::Client::new(&aws_config), resources.topic_arn());

        let bucket = resources.bucket_name();
        let archive: Option<Arc<dyn ObjectStore>> = if bucket.is_empty() {
            None
        } else {
            Some(Arc::new(S3ObjectStore::new(
                aws_sdk_s3::Client::new(&aws_config),
                bucket,
            )))
        };

        Ok(Self {
            store: Arc::new(store),
            queue: Arc::new(queue),
            sink: Arc::new(sink),
            archive,
        })
    }
}
