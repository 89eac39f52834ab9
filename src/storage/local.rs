// src/storage/local.rs

//! Local JSONL posting log.
//!
//! Every posting the crawler processes is appended as one JSON line, which
//! gives local runs a durable trace without any cloud dependency.

use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::Posting;

/// Append-only JSONL file of processed postings.
#[derive(Clone)]
pub struct PostingLog {
    path: PathBuf,
}

impl PostingLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one posting as a JSON line.
    pub async fn append(&self, posting: &Posting) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(posting)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
