// src/pipeline/crawl.rs

//! Crawl pipeline entry point.

use std::sync::Arc;

use crate::context::AppContext;
use crate::error::Result;
use crate::models::Config;
use crate::services::{CrawlOutcome, ListingCrawler};
use crate::utils::http::PageFetcher;

/// Run the crawler over every configured search query in sequence.
///
/// A query that fails mid-pagination does not affect the ones after it.
pub async fn run_crawler(
    config: Arc<Config>,
    fetcher: Arc<dyn PageFetcher>,
    ctx: &AppContext,
) -> Result<CrawlOutcome> {
    let crawler = ListingCrawler::new(
        Arc::clone(&config),
        fetcher,
        Arc::clone(&ctx.store),
        Arc::clone(&ctx.queue),
    )?;

    let mut total = CrawlOutcome::default();
    for keyword in &config.search.keywords {
        log::info!("Crawling query '{keyword}'");
        match crawler.crawl_query(keyword).await {
            Ok(outcome) => {
                log::info!(
                    "Query '{keyword}': {} pages, {} postings, {} new, {} dispatched",
                    outcome.pages_fetched,
                    outcome.postings_seen,
                    outcome.new_records,
                    outcome.dispatched
                );
                total.absorb(outcome);
            }
            Err(error) => log::warn!("Query '{keyword}' aborted: {error}"),
        }
    }

    log::info!(
        "Crawl complete: {} postings seen, {} new records, {} dispatched, {} held, {} skipped",
        total.postings_seen,
        total.new_records,
        total.dispatched,
        total.held,
        total.skipped
    );

    Ok(total)
}
