// src/queue/sns.rs

//! AWS SNS fan-out sink implementation.

use async_trait::async_trait;
use aws_sdk_sns::Client;

use crate::error::{AppError, Result};
use crate::queue::FanoutSink;

/// SNS topic publishing tokenized postings to subscribers.
pub struct SnsSink {
    client: Client,
    topic_arn: String,
}

impl SnsSink {
    pub fn new(client: Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }
}

#[async_trait]
impl FanoutSink for SnsSink {
    async fn publish(&self, body: &str) -> Result<()> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(body)
            .send()
            .await
            .map_err(|e| AppError::sink(e.into_service_error()))?;
        Ok(())
    }
}
