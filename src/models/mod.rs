// src/models/mod.rs

//! Domain models for the ingestion pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod posting;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, PreprocessConfig, ResourceConfig, SearchConfig, SelectorConfig,
    StoreConfig,
};
pub use posting::{Posting, TokenizedPosting};
