// src/queue/sqs.rs

//! AWS SQS dispatch queue implementation.
//!
//! Visibility timeout and dead-letter redrive are queue configuration, not
//! client behavior; this client only publishes, receives, and deletes.

use async_trait::async_trait;
use aws_sdk_sqs::Client;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::queue::{DispatchQueue, QueueMessage};

/// SQS-backed dispatch queue.
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    /// Create a queue client against a known queue URL.
    pub fn new(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// Resolve a queue name to its URL and build the client.
    pub async fn from_name(client: Client, queue_name: &str) -> Result<Self> {
        let output = client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .map_err(|e| AppError::queue(e.into_service_error()))?;

        let queue_url = output
            .queue_url()
            .ok_or_else(|| AppError::queue(format!("no URL for queue {queue_name}")))?
            .to_string();

        Ok(Self::new(client, queue_url))
    }
}

#[async_trait]
impl DispatchQueue for SqsQueue {
    async fn publish(&self, body: &str) -> Result<String> {
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| AppError::publish(e.into_service_error()))?;

        output
            .md5_of_message_body()
            .map(str::to_string)
            .ok_or_else(|| AppError::publish("send_message returned no body digest"))
    }

    async fn receive(&self, max_messages: usize) -> Result<Vec<QueueMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages.min(10) as i32)
            .send()
            .await
            .map_err(|e| AppError::queue(e.into_service_error()))?;

        let mut messages = Vec::new();
        for message in output.messages() {
            match (message.body(), message.receipt_handle()) {
                (Some(body), Some(handle)) => messages.push(QueueMessage {
                    body: body.to_string(),
                    handle: handle.to_string(),
                }),
                _ => warn!("received message without body or receipt handle, skipping"),
            }
        }
        Ok(messages)
    }

    async fn delete(&self, handle: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(handle)
            .send()
            .await
            .map_err(|e| AppError::queue(e.into_service_error()))?;
        Ok(())
    }
}
