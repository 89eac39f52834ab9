// src/services/listings.rs

//! Paginated listing crawler service.
//!
//! Drives pagination across a search query, runs every listing card
//! through field extraction, detail fetch, the dedup/retry decision, and
//! conditional dispatch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::models::{Config, Posting};
use crate::queue::DispatchQueue;
use crate::services::extract::{self, CardSelectors};
use crate::storage::PostingLog;
use crate::store::DedupStore;
use crate::utils::http::PageFetcher;
use crate::utils::url::with_start;

/// Summary of a crawl run.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub pages_fetched: usize,
    pub page_failures: usize,
    pub postings_seen: usize,
    pub new_records: usize,
    pub dispatched: usize,
    pub skipped: usize,
    pub held: usize,
    pub integrity_failures: usize,
    pub publish_failures: usize,
}

impl CrawlOutcome {
    /// Fold another outcome into this one.
    pub fn absorb(&mut self, other: CrawlOutcome) {
        self.pages_fetched += other.pages_fetched;
        self.page_failures += other.page_failures;
        self.postings_seen += other.postings_seen;
        self.new_records += other.new_records;
        self.dispatched += other.dispatched;
        self.skipped += other.skipped;
        self.held += other.held;
        self.integrity_failures += other.integrity_failures;
        self.publish_failures += other.publish_failures;
    }
}

/// Service crawling postings from the paginated listing source.
pub struct ListingCrawler {
    config: Arc<Config>,
    selectors: CardSelectors,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn DedupStore>,
    dispatcher: Dispatcher,
    posting_log: Option<PostingLog>,
}

impl ListingCrawler {
    /// Create a new crawler over the injected collaborators.
    pub fn new(
        config: Arc<Config>,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn DedupStore>,
        queue: Arc<dyn DispatchQueue>,
    ) -> Result<Self> {
        let selectors = CardSelectors::compile(&config.selectors)?;
        let posting_log = config.crawler.posting_log.as_ref().map(PostingLog::new);
        let dispatcher = Dispatcher::new(Arc::clone(&store), queue);

        Ok(Self {
            config,
            selectors,
            fetcher,
            store,
            dispatcher,
            posting_log,
        })
    }

    /// Crawl one search query through all of its pages.
    ///
    /// The cursor advances by the number of cards on each page; the first
    /// empty page terminates the query. A page-level fetch failure also
    /// terminates the query; other queries are unaffected.
    pub async fn crawl_query(&self, keyword: &str) -> Result<CrawlOutcome> {
        let mut outcome = CrawlOutcome::default();
        let search_url = self.config.search.listing_url.replace("{keywords}", keyword);
        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);
        let mut cursor = 0usize;

        loop {
            let page_url = with_start(&search_url, cursor)?;
            let html = match self.fetcher.fetch(&page_url).await {
                Ok(html) => html,
                Err(error) => {
                    outcome.page_failures += 1;
                    log::warn!("Failed to fetch listing page {page_url}: {error}");
                    break;
                }
            };
            outcome.pages_fetched += 1;

            let cards = extract::extract_cards(&html, &self.selectors);
            if cards.is_empty() {
                break;
            }

            let count = cards.len();
            for posting in cards {
                self.process_posting(posting, &mut outcome).await;
            }

            cursor += count;

            // Pace page fetches so the source does not reset the connection.
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(outcome)
    }

    /// Attach the description and run one posting through the decision
    /// table, then append it to the posting log if one is configured.
    async fn process_posting(&self, mut posting: Posting, outcome: &mut CrawlOutcome) {
        outcome.postings_seen += 1;

        posting.description = self.fetch_description(&posting.id).await;
        posting.expires_at =
            (Utc::now() + chrono::Duration::days(self.config.store.ttl_days)).timestamp();

        self.apply_decision(&posting, outcome).await;

        if let Some(log_file) = &self.posting_log {
            if let Err(error) = log_file.append(&posting).await {
                log::warn!("Failed to append posting {} to log: {error}", posting.id);
            }
        }
    }

    /// Fetch the description body for a posting, degrading to the empty
    /// string on any failure.
    async fn fetch_description(&self, id: &str) -> String {
        let url = format!("{}{}", self.config.search.detail_url, id);
        match self.fetcher.fetch(&url).await {
            Ok(html) => extract::extract_description(&html, &self.selectors),
            Err(error) => {
                log::warn!("Failed to fetch detail page for posting {id}: {error}");
                String::new()
            }
        }
    }

    /// The dedup/retry decision table.
    ///
    /// - unseen id: insert, dispatch if a description is attached
    /// - seen and dispatched: nothing to do
    /// - seen but not dispatched: dispatch once a description is available
    async fn apply_decision(&self, posting: &Posting, outcome: &mut CrawlOutcome) {
        let existing = match self.store.lookup(&posting.id).await {
            Ok(existing) => existing,
            Err(error) => {
                log::warn!(
                    "Dedup lookup failed for {}: {error}; treating as unseen",
                    posting.id
                );
                None
            }
        };

        match existing {
            None => {
                match self.store.insert(posting).await {
                    Ok(()) => outcome.new_records += 1,
                    Err(error) => {
                        log::warn!("Failed to persist posting {}: {error}", posting.id);
                    }
                }
                if posting.has_description() {
                    self.try_dispatch(posting, outcome).await;
                } else {
                    outcome.held += 1;
                }
            }
            Some(existing) if existing.dispatched => {
                outcome.skipped += 1;
            }
            Some(_) => {
                // Retry path: the description failed to attach on an
                // earlier sighting.
                if posting.has_description() {
                    self.try_dispatch(posting, outcome).await;
                } else {
                    outcome.held += 1;
                }
            }
        }
    }

    async fn try_dispatch(&self, posting: &Posting, outcome: &mut CrawlOutcome) {
        match self.dispatcher.dispatch(posting).await {
            Ok(true) => outcome.dispatched += 1,
            Ok(false) => outcome.integrity_failures += 1,
            Err(error) => {
                outcome.publish_failures += 1;
                log::warn!("Failed to publish posting {}: {error}", posting.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::AppError;
    use crate::queue::MemoryQueue;
    use crate::store::MemoryStore;

    const CARDS_PER_PAGE: usize = 2;

    fn test_config() -> Arc<Config> {
        let mut config = Config::default();
        config.search.listing_url =
            "https://example.com/jobs/search?keywords={keywords}&start=0".to_string();
        config.search.detail_url = "https://example.com/jobs/detail/".to_string();
        config.crawler.request_delay_ms = 0;
        Arc::new(config)
    }

    fn card(id: &str) -> String {
        format!(
            r##"<li><div class="base-card" data-entity-urn="urn:li:jobPosting:{id}">
               <a href="#"><span>Job {id}</span></a>
               <h4><a href="#">Acme</a></h4>
               <span class="job-search-card__location">Remote</span>
               <time datetime="2026-07-30">recently</time>
           </div></li>"##
        )
    }

    fn page_of(ids: &[&str]) -> String {
        let mut html = String::from("<ul>");
        for id in ids {
            html.push_str(&card(id));
        }
        html.push_str("</ul>");
        html
    }

    fn detail_page(text: &str) -> String {
        format!(r#"<div class="show-more-less-html__markup">{text}</div>"#)
    }

    /// Serves canned listing pages by cursor and detail pages by id.
    struct StubFetcher {
        pages: Vec<String>,
        details: HashMap<String, String>,
        listing_fetches: Mutex<usize>,
        fail_listing: bool,
    }

    impl StubFetcher {
        fn new(pages: Vec<String>, details: HashMap<String, String>) -> Self {
            Self {
                pages,
                details,
                listing_fetches: Mutex::new(0),
                fail_listing: false,
            }
        }

        fn listing_fetches(&self) -> usize {
            *self.listing_fetches.lock().unwrap()
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            if url.contains("/detail/") {
                let id = url.rsplit('/').next().unwrap_or_default();
                return Ok(self.details.get(id).cloned().unwrap_or_default());
            }

            *self.listing_fetches.lock().unwrap() += 1;
            if self.fail_listing {
                return Err(AppError::fetch(url, "connection reset"));
            }

            let start: usize = url
                .split("start=")
                .nth(1)
                .and_then(|rest| rest.split('&').next())
                .and_then(|value| value.parse().ok())
                .unwrap_or(0);
            Ok(self
                .pages
                .get(start / CARDS_PER_PAGE)
                .cloned()
                .unwrap_or_else(|| "<ul></ul>".to_string()))
        }
    }

    fn crawler(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<MemoryStore>,
        queue: Arc<MemoryQueue>,
    ) -> ListingCrawler {
        ListingCrawler::new(test_config(), fetcher, store, queue).unwrap()
    }

    fn details_for(ids: &[&str]) -> HashMap<String, String> {
        ids.iter()
            .map(|id| (id.to_string(), detail_page("A solid description.")))
            .collect()
    }

    #[tokio::test]
    async fn test_pagination_terminates_on_empty_page() {
        let pages = vec![
            page_of(&["1", "2"]),
            page_of(&["3", "4"]),
            page_of(&["5", "6"]),
        ];
        let fetcher = Arc::new(StubFetcher::new(
            pages,
            details_for(&["1", "2", "3", "4", "5", "6"]),
        ));
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new(Duration::ZERO, 3));

        let outcome = crawler(fetcher.clone(), store.clone(), queue)
            .crawl_query("Devops")
            .await
            .unwrap();

        // Three non-empty pages plus the terminating empty one.
        assert_eq!(fetcher.listing_fetches(), 4);
        assert_eq!(outcome.pages_fetched, 4);
        assert_eq!(outcome.postings_seen, 6);
        assert_eq!(outcome.new_records, 6);
        assert_eq!(store.len(), 6);
    }

    #[tokio::test]
    async fn test_repeated_sighting_yields_one_record() {
        let fetcher = Arc::new(StubFetcher::new(
            vec![page_of(&["1"])],
            details_for(&["1"]),
        ));
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new(Duration::ZERO, 3));

        for _ in 0..2 {
            crawler(fetcher.clone(), store.clone(), queue.clone())
                .crawl_query("Devops")
                .await
                .unwrap();
        }

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_posting_without_description_is_held_then_dispatched_once() {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new(Duration::ZERO, 3));

        // First sighting: detail page yields nothing.
        let blind_fetcher = Arc::new(StubFetcher::new(vec![page_of(&["1"])], HashMap::new()));
        let outcome = crawler(blind_fetcher, store.clone(), queue.clone())
            .crawl_query("Devops")
            .await
            .unwrap();
        assert_eq!(outcome.held, 1);
        assert_eq!(outcome.dispatched, 0);
        assert!(queue.is_empty());

        // Second sighting: description now available, record not dispatched.
        let sighted_fetcher = Arc::new(StubFetcher::new(vec![page_of(&["1"])], details_for(&["1"])));
        let outcome = crawler(sighted_fetcher.clone(), store.clone(), queue.clone())
            .crawl_query("Devops")
            .await
            .unwrap();
        assert_eq!(outcome.dispatched, 1);
        assert_eq!(outcome.new_records, 0);
        assert_eq!(queue.len(), 1);
        assert!(store.lookup("1").await.unwrap().unwrap().dispatched);

        // Third sighting: already dispatched, nothing published.
        let outcome = crawler(sighted_fetcher, store.clone(), queue.clone())
            .crawl_query("Devops")
            .await
            .unwrap();
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.dispatched, 0);
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_new_posting_with_description_dispatches_immediately() {
        let fetcher = Arc::new(StubFetcher::new(
            vec![page_of(&["1", "2"])],
            details_for(&["1", "2"]),
        ));
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new(Duration::ZERO, 3));

        let outcome = crawler(fetcher, store.clone(), queue.clone())
            .crawl_query("Devops")
            .await
            .unwrap();

        assert_eq!(outcome.dispatched, 2);
        assert_eq!(queue.len(), 2);
        assert!(store.lookup("1").await.unwrap().unwrap().dispatched);
        assert!(store.lookup("2").await.unwrap().unwrap().dispatched);
    }

    #[tokio::test]
    async fn test_listing_fetch_failure_ends_query_quietly() {
        let mut stub = StubFetcher::new(vec![page_of(&["1"])], details_for(&["1"]));
        stub.fail_listing = true;
        let fetcher = Arc::new(stub);
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new(Duration::ZERO, 3));

        let outcome = crawler(fetcher, store.clone(), queue)
            .crawl_query("Devops")
            .await
            .unwrap();

        assert_eq!(outcome.page_failures, 1);
        assert_eq!(outcome.pages_fetched, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_detail_failure_degrades_to_held_posting() {
        // Detail pages missing entirely; the posting is still recorded.
        let fetcher = Arc::new(StubFetcher::new(vec![page_of(&["1"])], HashMap::new()));
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new(Duration::ZERO, 3));

        let outcome = crawler(fetcher, store.clone(), queue.clone())
            .crawl_query("Devops")
            .await
            .unwrap();

        assert_eq!(outcome.new_records, 1);
        assert_eq!(outcome.held, 1);
        assert!(queue.is_empty());
        let record = store.lookup("1").await.unwrap().unwrap();
        assert!(record.description.is_empty());
        assert!(!record.dispatched);
    }

    #[tokio::test]
    async fn test_record_expiry_is_stamped() {
        let fetcher = Arc::new(StubFetcher::new(vec![page_of(&["1"])], details_for(&["1"])));
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new(Duration::ZERO, 3));

        crawler(fetcher, store.clone(), queue)
            .crawl_query("Devops")
            .await
            .unwrap();

        let record = store.lookup("1").await.unwrap().unwrap();
        assert!(record.expires_at > Utc::now().timestamp());
    }
}
