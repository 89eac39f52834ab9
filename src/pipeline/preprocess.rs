// src/pipeline/preprocess.rs

//! Queue-consuming preprocessing pipeline.
//!
//! Pulls dispatched postings off the queue in bounded batches, tokenizes
//! their descriptions under the configured budget, and forwards the
//! filtered projection to the fan-out sink. Messages are only
//! acknowledged after a successful forward; everything else is left for
//! redelivery and, eventually, the dead-letter channel.

use chrono::Utc;

use crate::chunk::{TextTokenizer, tokenize_bounded};
use crate::context::AppContext;
use crate::error::Result;
use crate::models::{Config, Posting, TokenizedPosting};
use crate::queue::QueueMessage;
use crate::storage::archive_key;

/// Summary of a preprocessing run.
#[derive(Debug, Default)]
pub struct PreprocessOutcome {
    pub received: usize,
    pub forwarded: usize,
    pub malformed: usize,
    pub failures: usize,
    pub archived: usize,
}

/// Drain the queue: keep pulling batches until one comes back empty.
pub async fn run_preprocess(
    ctx: &AppContext,
    tokenizer: &dyn TextTokenizer,
    config: &Config,
) -> Result<PreprocessOutcome> {
    let mut outcome = PreprocessOutcome::default();

    loop {
        let batch = ctx.queue.receive(config.preprocess.batch_size).await?;
        if batch.is_empty() {
            break;
        }
        for message in batch {
            process_message(ctx, tokenizer, config, &message, &mut outcome).await;
        }
    }

    log::info!(
        "Preprocess complete: {} received, {} forwarded, {} malformed, {} failed",
        outcome.received,
        outcome.forwarded,
        outcome.malformed,
        outcome.failures
    );

    Ok(outcome)
}

/// Process a single batch, for invocation-per-batch deployments.
pub async fn run_preprocess_batch(
    ctx: &AppContext,
    tokenizer: &dyn TextTokenizer,
    config: &Config,
) -> Result<PreprocessOutcome> {
    let mut outcome = PreprocessOutcome::default();
    let batch = ctx.queue.receive(config.preprocess.batch_size).await?;
    for message in batch {
        process_message(ctx, tokenizer, config, &message, &mut outcome).await;
    }
    Ok(outcome)
}

async fn process_message(
    ctx: &AppContext,
    tokenizer: &dyn TextTokenizer,
    config: &Config,
    message: &QueueMessage,
    outcome: &mut PreprocessOutcome,
) {
    outcome.received += 1;

    let posting: Posting = match serde_json::from_str(&message.body) {
        Ok(posting) => posting,
        Err(error) => {
            outcome.malformed += 1;
            log::warn!("Malformed queue message, leaving for redelivery: {error}");
            return;
        }
    };

    let tokens = match tokenize_bounded(tokenizer, &posting.description, config.preprocess.max_tokens)
    {
        Ok(tokens) => tokens,
        Err(error) => {
            outcome.failures += 1;
            log::warn!("Tokenization failed for posting {}: {error}", posting.id);
            return;
        }
    };

    let projection = TokenizedPosting::new(&posting, tokens);
    let body = match serde_json::to_string(&projection) {
        Ok(body) => body,
        Err(error) => {
            outcome.failures += 1;
            log::warn!("Failed to serialize projection for {}: {error}", posting.id);
            return;
        }
    };

    if let Err(error) = ctx.sink.publish(&body).await {
        outcome.failures += 1;
        log::warn!("Fan-out publish failed for posting {}: {error}", posting.id);
        return;
    }
    outcome.forwarded += 1;

    // The fan-out already happened; an archive failure must not hold the
    // message for redelivery, or subscribers would see it twice.
    if let Some(archive) = &ctx.archive {
        let key = archive_key(&config.resources.key_prefix(), &posting.title, Utc::now());
        match archive.write_json(&key, &body).await {
            Ok(()) => outcome.archived += 1,
            Err(error) => log::warn!("Failed to archive posting {}: {error}", posting.id),
        }
    }

    if let Err(error) = ctx.queue.delete(&message.handle).await {
        log::warn!(
            "Failed to acknowledge message for posting {}: {error}; it will be redelivered",
            posting.id
        );
    }
}
