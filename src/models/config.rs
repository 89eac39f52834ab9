//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Search queries and source endpoints
    #[serde(default)]
    pub search: SearchConfig,

    /// CSS selectors for listing fragments
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Dedup store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Downstream chunking/tokenization settings
    #[serde(default)]
    pub preprocess: PreprocessConfig,

    /// Names of deployment-bound resources
    #[serde(default)]
    pub resources: ResourceConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.search.keywords.is_empty() {
            return Err(AppError::validation("No search keywords defined"));
        }
        if !self.search.listing_url.contains("{keywords}") {
            return Err(AppError::validation(
                "search.listing_url must contain a {keywords} placeholder",
            ));
        }
        if self.search.detail_url.trim().is_empty() {
            return Err(AppError::validation("search.detail_url is empty"));
        }
        if self.preprocess.batch_size == 0 {
            return Err(AppError::validation("preprocess.batch_size must be > 0"));
        }
        if self.preprocess.max_tokens < 4 {
            return Err(AppError::validation(
                "preprocess.max_tokens must be >= 4 to leave room for at least one word per chunk",
            ));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between page fetches in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Optional path of a JSONL log receiving every processed posting
    #[serde(default)]
    pub posting_log: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            posting_log: None,
        }
    }
}

/// Search queries and source endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search keywords, each crawled as an independent paginated query
    #[serde(default = "defaults::keywords")]
    pub keywords: Vec<String>,

    /// Listing endpoint template; `{keywords}` is replaced per query and the
    /// `start` query parameter carries the pagination cursor
    #[serde(default = "defaults::listing_url")]
    pub listing_url: String,

    /// Detail endpoint base; the posting id is appended
    #[serde(default = "defaults::detail_url")]
    pub detail_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: defaults::keywords(),
            listing_url: defaults::listing_url(),
            detail_url: defaults::detail_url(),
        }
    }
}

/// CSS selectors for extracting fields from a listing fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Selector matching one listing card
    #[serde(default = "defaults::card_selector")]
    pub card: String,

    /// Attribute on the card carrying the posting URN (id is its last segment)
    #[serde(default = "defaults::id_attr")]
    pub id_attr: String,

    /// Selector for the title element
    #[serde(default = "defaults::title_selector")]
    pub title: String,

    /// Selector for the company element
    #[serde(default = "defaults::company_selector")]
    pub company: String,

    /// Selector for the location element
    #[serde(default = "defaults::location_selector")]
    pub location: String,

    /// Selector for the publication date element
    #[serde(default = "defaults::published_selector")]
    pub published_at: String,

    /// Attribute on the date element holding the machine-readable timestamp
    #[serde(default = "defaults::published_attr")]
    pub published_at_attr: String,

    /// Selector for the description container on the detail page
    #[serde(default = "defaults::description_selector")]
    pub description: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: defaults::card_selector(),
            id_attr: defaults::id_attr(),
            title: defaults::title_selector(),
            company: defaults::company_selector(),
            location: defaults::location_selector(),
            published_at: defaults::published_selector(),
            published_at_attr: defaults::published_attr(),
            description: defaults::description_selector(),
        }
    }
}

/// Dedup store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Days before a stored record becomes eligible for store-side expiry
    #[serde(default = "defaults::ttl_days")]
    pub ttl_days: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl_days: defaults::ttl_days(),
        }
    }
}

/// Downstream chunking/tokenization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Maximum messages pulled per queue receive
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Token budget per tokenizer pass
    #[serde(default = "defaults::max_tokens")]
    pub max_tokens: usize,

    /// Pretrained tokenizer model name
    #[serde(default = "defaults::tokenizer_model")]
    pub tokenizer_model: String,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::batch_size(),
            max_tokens: defaults::max_tokens(),
            tokenizer_model: defaults::tokenizer_model(),
        }
    }
}

/// Names of deployment-bound resources.
///
/// Environment variables take precedence over the file values so deployed
/// instances can be rewired without editing config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Dedup store table name
    #[serde(default)]
    pub table_name: String,

    /// Dispatch queue name
    #[serde(default)]
    pub queue_name: String,

    /// Fan-out topic identifier
    #[serde(default)]
    pub topic_arn: String,

    /// Archive bucket name
    #[serde(default)]
    pub bucket_name: String,

    /// Key prefix for archived postings
    #[serde(default = "defaults::key_prefix")]
    pub key_prefix: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            table_name: String::new(),
            queue_name: String::new(),
            topic_arn: String::new(),
            bucket_name: String::new(),
            key_prefix: defaults::key_prefix(),
        }
    }
}

impl ResourceConfig {
    pub fn table_name(&self) -> String {
        env_or("DEDUP_TABLE_NAME", &self.table_name)
    }

    pub fn queue_name(&self) -> String {
        env_or("DISPATCH_QUEUE_NAME", &self.queue_name)
    }

    pub fn topic_arn(&self) -> String {
        env_or("FANOUT_TOPIC_ARN", &self.topic_arn)
    }

    pub fn bucket_name(&self) -> String {
        env_or("ARCHIVE_BUCKET_NAME", &self.bucket_name)
    }

    pub fn key_prefix(&self) -> String {
        env_or("ARCHIVE_KEY_PREFIX", &self.key_prefix)
    }
}

fn env_or(var: &str, fallback: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| fallback.to_string())
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobfeed/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        1000
    }

    // Search defaults
    pub fn keywords() -> Vec<String> {
        vec![
            "Data+Analyst".into(),
            "Data+Scientist".into(),
            "Cloud+Engineer".into(),
            "Devops".into(),
            "Frontend+Developer".into(),
            "Backend+Developer".into(),
            "Software+Engineer".into(),
            "Fullstack+Developer".into(),
            "Mobile+Developer".into(),
            "Game+Developer".into(),
            "Artificial+Intelligence".into(),
            "Python+Developer".into(),
        ]
    }
    pub fn listing_url() -> String {
        "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search?keywords={keywords}&geoId=103350119&start=0".into()
    }
    pub fn detail_url() -> String {
        "https://www.linkedin.com/jobs-guest/jobs/api/jobPosting/".into()
    }

    // Selector defaults
    pub fn card_selector() -> String {
        "li div.base-card".into()
    }
    pub fn id_attr() -> String {
        "data-entity-urn".into()
    }
    pub fn title_selector() -> String {
        "a span".into()
    }
    pub fn company_selector() -> String {
        "h4 a".into()
    }
    pub fn location_selector() -> String {
        "span.job-search-card__location".into()
    }
    pub fn published_selector() -> String {
        "time".into()
    }
    pub fn published_attr() -> String {
        "datetime".into()
    }
    pub fn description_selector() -> String {
        "div.show-more-less-html__markup".into()
    }

    // Store defaults
    pub fn ttl_days() -> i64 {
        30
    }

    // Preprocess defaults
    pub fn batch_size() -> usize {
        5
    }
    pub fn max_tokens() -> usize {
        512
    }
    pub fn tokenizer_model() -> String {
        "bert-base-multilingual-uncased".into()
    }

    // Resource defaults
    pub fn key_prefix() -> String {
        "Preprocessed-data".into()
    }
}
