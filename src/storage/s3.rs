// src/storage/s3.rs

//! AWS S3 object store implementation.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::error::{AppError, Result};
use crate::storage::ObjectStore;

/// S3-backed object store for archived postings.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a new S3 object store.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn write_json(&self, key: &str, body: &str) -> Result<()> {
        let bytes = ByteStream::from(body.as_bytes().to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(bytes)
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::store(e.into_service_error()))?;

        info!("Wrote s3://{}/{}", self.bucket, key);
        Ok(())
    }
}
