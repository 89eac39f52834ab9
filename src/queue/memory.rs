// src/queue/memory.rs

//! In-memory queue and sink for local runs and tests.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::queue::{DispatchQueue, FanoutSink, QueueMessage, body_checksum};

struct Stored {
    body: String,
    handle: String,
    receive_count: u32,
    visible_at: Instant,
}

#[derive(Default)]
struct Inner {
    messages: Vec<Stored>,
    dead: Vec<String>,
    next_handle: u64,
}

/// Queue modeling visibility timeout, receive counting, and dead-letter
/// routing, enough to exercise at-least-once consumers without a broker.
pub struct MemoryQueue {
    visibility_timeout: Duration,
    max_receive_count: u32,
    inner: Mutex<Inner>,
}

impl MemoryQueue {
    pub fn new(visibility_timeout: Duration, max_receive_count: u32) -> Self {
        Self {
            visibility_timeout,
            max_receive_count,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| AppError::queue(format!("lock poisoned: {e}")))
    }

    /// Messages still held by the queue, invisible ones included.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("queue lock poisoned").messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bodies routed to the dead-letter channel.
    pub fn dead_letters(&self) -> Vec<String> {
        self.inner.lock().expect("queue lock poisoned").dead.clone()
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), 3)
    }
}

#[async_trait]
impl DispatchQueue for MemoryQueue {
    async fn publish(&self, body: &str) -> Result<String> {
        let mut inner = self.lock()?;
        let handle = format!("handle-{}", inner.next_handle);
        inner.next_handle += 1;
        inner.messages.push(Stored {
            body: body.to_string(),
            handle,
            receive_count: 0,
            visible_at: Instant::now(),
        });
        Ok(body_checksum(body))
    }

    async fn receive(&self, max_messages: usize) -> Result<Vec<QueueMessage>> {
        let mut inner = self.lock()?;
        let now = Instant::now();
        let mut delivered = Vec::new();

        let mut index = 0;
        while index < inner.messages.len() && delivered.len() < max_messages {
            if inner.messages[index].visible_at > now {
                index += 1;
                continue;
            }

            if inner.messages[index].receive_count >= self.max_receive_count {
                let expired = inner.messages.remove(index);
                inner.dead.push(expired.body);
                continue;
            }

            let message = &mut inner.messages[index];
            message.receive_count += 1;
            message.visible_at = now + self.visibility_timeout;
            delivered.push(QueueMessage {
                body: message.body.clone(),
                handle: message.handle.clone(),
            });
            index += 1;
        }

        Ok(delivered)
    }

    async fn delete(&self, handle: &str) -> Result<()> {
        let mut inner = self.lock()?;
        inner.messages.retain(|m| m.handle != handle);
        Ok(())
    }
}

/// Sink collecting published bodies in memory.
#[derive(Default)]
pub struct MemorySink {
    published: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().expect("sink lock poisoned").clone()
    }
}

#[async_trait]
impl FanoutSink for MemorySink {
    async fn publish(&self, body: &str) -> Result<()> {
        self.published
            .lock()
            .map_err(|e| AppError::sink(format!("lock poisoned: {e}")))?
            .push(body.to_string());
        Ok(())
    }
}
