// src/store/dynamo.rs

//! AWS DynamoDB dedup store implementation.
//!
//! One item per posting, keyed by `id`. The table's TTL attribute is
//! `expires_at`, so expired records disappear without explicit deletes.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::models::Posting;
use crate::store::DedupStore;

/// DynamoDB-backed dedup store.
pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    /// Create a new store against the given table.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn string_field(item: &HashMap<String, AttributeValue>, name: &str) -> String {
        item.get(name)
            .and_then(|av| av.as_s().ok())
            .cloned()
            .unwrap_or_default()
    }

    fn parse_item(item: &HashMap<String, AttributeValue>) -> Posting {
        let dispatched = item
            .get("dispatched")
            .and_then(|av| av.as_bool().ok())
            .copied()
            .unwrap_or(false);
        let expires_at = item
            .get("expires_at")
            .and_then(|av| av.as_n().ok())
            .and_then(|n| n.parse::<i64>().ok())
            .unwrap_or(0);

        Posting {
            id: Self::string_field(item, "id"),
            title: Self::string_field(item, "title"),
            company: Self::string_field(item, "company"),
            location: Self::string_field(item, "location"),
            published_at: Self::string_field(item, "published_at"),
            description: Self::string_field(item, "description"),
            dispatched,
            expires_at,
        }
    }
}

#[async_trait]
impl DedupStore for DynamoStore {
    async fn lookup(&self, id: &str) -> Result<Option<Posting>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| AppError::store(e.into_service_error()))?;

        match output.item() {
            Some(item) => {
                let posting = Self::parse_item(item);
                if posting.id.is_empty() {
                    warn!("dedup item for {id} has no id attribute, treating as absent");
                    return Ok(None);
                }
                Ok(Some(posting))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, posting: &Posting) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item("id", AttributeValue::S(posting.id.clone()))
            .item("title", AttributeValue::S(posting.title.clone()))
            .item("company", AttributeValue::S(posting.company.clone()))
            .item("location", AttributeValue::S(posting.location.clone()))
            .item(
                "published_at",
                AttributeValue::S(posting.published_at.clone()),
            )
            .item(
                "description",
                AttributeValue::S(posting.description.clone()),
            )
            .item("dispatched", AttributeValue::Bool(posting.dispatched))
            .item(
                "expires_at",
                AttributeValue::N(posting.expires_at.to_string()),
            )
            .send()
            .await
            .map_err(|e| AppError::store(e.into_service_error()))?;
        Ok(())
    }

    async fn mark_dispatched(&self, id: &str) -> Result<()> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression("SET dispatched = :val")
            .expression_attribute_values(":val", AttributeValue::Bool(true))
            .send()
            .await
            .map_err(|e| AppError::store(e.into_service_error()))?;
        Ok(())
    }
}
