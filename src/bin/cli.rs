//! jobfeed CLI
//!
//! Local execution entry point. For AWS Lambda, use `jobfeed-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jobfeed::{
    chunk::HfTokenizer,
    context::AppContext,
    error::Result,
    models::Config,
    pipeline,
    utils::http::HttpFetcher,
};

/// jobfeed - Job Posting Ingestion Pipeline
#[derive(Parser, Debug)]
#[command(
    name = "jobfeed",
    version,
    about = "Crawls job boards, deduplicates postings, and feeds a tokenization pipeline"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl all configured search queries and dispatch new postings
    Crawl,

    /// Consume the dispatch queue and fan out tokenized postings
    Preprocess {
        /// Process a single batch instead of draining the queue
        #[arg(long)]
        once: bool,
    },

    /// Run full pipeline: Crawl → Preprocess
    Pipeline,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Build the collaborator context for the enabled features.
async fn build_context(config: &Config) -> Result<AppContext> {
    #[cfg(feature = "aws")]
    let ctx = AppContext::from_env(config).await?;

    #[cfg(not(feature = "aws"))]
    let ctx = {
        let _ = config;
        log::warn!("Built without the aws feature; using in-memory collaborators (dry run)");
        AppContext::in_memory()
    };

    Ok(ctx)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("jobfeed starting...");

    let config = Config::load_or_default(&cli.config);
    config.validate()?;
    let config = Arc::new(config);

    match cli.command {
        Command::Crawl => {
            let ctx = build_context(&config).await?;
            let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
            pipeline::run_crawler(Arc::clone(&config), fetcher, &ctx).await?;
        }

        Command::Preprocess { once } => {
            let ctx = build_context(&config).await?;
            log::info!(
                "Loading tokenizer '{}'...",
                config.preprocess.tokenizer_model
            );
            let tokenizer = HfTokenizer::from_pretrained(&config.preprocess.tokenizer_model)?;

            if once {
                pipeline::run_preprocess_batch(&ctx, &tokenizer, &config).await?;
            } else {
                pipeline::run_preprocess(&ctx, &tokenizer, &config).await?;
            }
        }

        Command::Pipeline => {
            let ctx = build_context(&config).await?;

            log::info!("Step 1/2: Crawling postings...");
            let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
            pipeline::run_crawler(Arc::clone(&config), fetcher, &ctx).await?;

            log::info!("Step 2/2: Preprocessing dispatched postings...");
            let tokenizer = HfTokenizer::from_pretrained(&config.preprocess.tokenizer_model)?;
            pipeline::run_preprocess(&ctx, &tokenizer, &config).await?;

            log::info!("Pipeline complete!");
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (search queries, selectors, and budgets)");
        }
    }

    log::info!("Done!");

    Ok(())
}
