// src/queue/mod.rs

//! Dispatch queue and fan-out sink abstractions.
//!
//! The dispatch queue carries serialized postings between the crawler and
//! the preprocessing stage with at-least-once delivery: a received message
//! stays invisible for the visibility timeout, reappears if it was not
//! deleted, and moves to the dead-letter channel once it exceeds the
//! maximum receive count.

pub mod memory;

#[cfg(feature = "aws")]
pub mod sns;
#[cfg(feature = "aws")]
pub mod sqs;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use memory::{MemoryQueue, MemorySink};

#[cfg(feature = "aws")]
pub use sns::SnsSink;
#[cfg(feature = "aws")]
pub use sqs::SqsQueue;

/// One received message: serialized body plus its delivery handle.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub body: String,
    pub handle: String,
}

/// Queue carrying dispatched postings downstream.
#[async_trait]
pub trait DispatchQueue: Send + Sync {
    /// Publish a message body. Returns the checksum the queue service
    /// computed over the bytes it received.
    async fn publish(&self, body: &str) -> Result<String>;

    /// Receive up to `max_messages` currently-visible messages.
    async fn receive(&self, max_messages: usize) -> Result<Vec<QueueMessage>>;

    /// Acknowledge a message so it is never redelivered.
    async fn delete(&self, handle: &str) -> Result<()>;
}

/// Topic fanning tokenized postings out to subscribers.
#[async_trait]
pub trait FanoutSink: Send + Sync {
    async fn publish(&self, body: &str) -> Result<()>;
}

/// MD5 digest over a message body, hex-encoded.
///
/// Matches the body digest the queue service reports on publish, so the
/// dispatcher can verify transport integrity.
pub fn body_checksum(body: &str) -> String {
    format!("{:x}", md5::compute(body.as_bytes()))
}
