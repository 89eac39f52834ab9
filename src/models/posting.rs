//! Posting data structures.

use serde::{Deserialize, Serialize};

/// A job posting flowing through the pipeline.
///
/// Fields extracted from a listing page may be empty strings; an empty
/// `description` means the detail page has not yielded a body yet, and such
/// a posting is never dispatched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    /// Stable external identifier, unique key in the dedup store
    pub id: String,

    /// Posting title
    pub title: String,

    /// Company name
    pub company: String,

    /// Job location
    pub location: String,

    /// Publication timestamp as reported by the source
    pub published_at: String,

    /// Full description text, empty until the detail fetch succeeds
    pub description: String,

    /// Whether this posting has been published to the dispatch queue
    #[serde(default)]
    pub dispatched: bool,

    /// Epoch seconds after which the store may expire this record
    #[serde(default)]
    pub expires_at: i64,
}

impl Posting {
    /// True if the description is ready for dispatch.
    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }
}

/// The filtered projection forwarded to the fan-out sink after tokenization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenizedPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub tokens: Vec<String>,
}

impl TokenizedPosting {
    /// Build the projection from a posting and its token sequence.
    pub fn new(posting: &Posting, tokens: Vec<String>) -> Self {
        Self {
            id: posting.id.clone(),
            title: posting.title.clone(),
            company: posting.company.clone(),
            tokens,
        }
    }
}
