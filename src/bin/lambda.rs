//! AWS Lambda entry point for the preprocessing stage
//!
//! Deploy with `cargo lambda build --release --features lambda`.
//! Each invocation consumes one batch from the dispatch queue.

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};

use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobfeed::chunk::HfTokenizer;
use jobfeed::context::AppContext;
use jobfeed::models::Config;
use jobfeed::pipeline::run_preprocess_batch;

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("jobfeed preprocessing Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}

/// Handler for AWS Lambda events.
async fn handler(event: LambdaEvent<Value>) -> Result<Value, LambdaError> {
    info!("Received event: {:?}", event.payload);

    match process_one_batch().await {
        Ok(forwarded) => {
            info!("Lambda execution successful: {} postings forwarded", forwarded);
            Ok(serde_json::json!({
                "status": "success",
                "postings_forwarded": forwarded
            }))
        }
        Err(e) => {
            error!("Lambda execution failed: {}", e);
            Ok(serde_json::json!({
                "status": "error",
                "message": e.to_string()
            }))
        }
    }
}

async fn process_one_batch() -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    // Resource names come from the environment; the bundled file only
    // supplies selector and budget defaults.
    let config = Config::load_or_default("data/config.toml");
    config.validate()?;

    let ctx = AppContext::from_env(&config).await?;
    let tokenizer = HfTokenizer::from_pretrained(&config.preprocess.tokenizer_model)?;

    let outcome = run_preprocess_batch(&ctx, &tokenizer, &config).await?;
    info!(
        "Batch processed: {} received, {} forwarded, {} malformed",
        outcome.received, outcome.forwarded, outcome.malformed
    );

    Ok(outcome.forwarded)
}
