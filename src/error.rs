// src/error.rs

//! Unified error handling for the ingestion pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Listing or detail page fetch failed
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },

    /// Dedup store unavailable or rejected an operation
    #[error("Store error: {0}")]
    Store(String),

    /// Queue publish failed
    #[error("Publish error: {0}")]
    Publish(String),

    /// Queue receive/acknowledge failed
    #[error("Queue error: {0}")]
    Queue(String),

    /// Fan-out sink publish failed
    #[error("Sink error: {0}")]
    Sink(String),

    /// Queue message body could not be decoded
    #[error("Malformed message: {0}")]
    Malformed(String),

    /// Tokenizer failure
    #[error("Tokenize error: {0}")]
    Tokenize(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a dedup store error.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }

    /// Create a publish error.
    pub fn publish(message: impl fmt::Display) -> Self {
        Self::Publish(message.to_string())
    }

    /// Create a queue receive/acknowledge error.
    pub fn queue(message: impl fmt::Display) -> Self {
        Self::Queue(message.to_string())
    }

    /// Create a fan-out sink error.
    pub fn sink(message: impl fmt::Display) -> Self {
        Self::Sink(message.to_string())
    }

    /// Create a tokenizer error.
    pub fn tokenize(message: impl fmt::Display) -> Self {
        Self::Tokenize(message.to_string())
    }
}
