use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::batch::IngestBatch;
use crate::record::{AliasRecord, ContentRecord};
use crate::types::PageId;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage constraint violated: {0}")]
    Constraint(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub page_id: PageId,
    pub topic_key: String,
    pub opened_at: DateTime<Utc>,
}

/// Query and write contract of the on-device content database.
///
/// `apply_batch` must be atomic per call. Title queries take already-normalized input.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn apply_batch(&self, batch: &IngestBatch) -> Result<(), StorageError>;

    async fn record(&self, page_id: PageId) -> Result<Option<ContentRecord>, StorageError>;

    async fn aliases(&self, page_id: PageId) -> Result<Vec<AliasRecord>, StorageError>;

    async fn record_count(&self, lang: &str) -> Result<usize, StorageError>;

    /// Non-disambiguation records, best quality first, ties by page id.
    async fn feed_candidates(&self, lang: &str, limit: usize) -> Result<Vec<ContentRecord>, StorageError>;

    async fn search_exact_title(
        &self,
        lang: &str,
        normalized_query: &str,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, StorageError>;

    async fn search_title_prefix(
        &self,
        lang: &str,
        normalized_prefix: &str,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, StorageError>;

    /// Records with an alias equal to, or starting with, the query.
    async fn search_alias(
        &self,
        lang: &str,
        normalized_query: &str,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, StorageError>;

    /// Records whose normalized title starts with `first_char` and whose length
    /// (in chars) lies in `min_len..=max_len`, best quality first.
    async fn typo_candidates(
        &self,
        lang: &str,
        first_char: char,
        min_len: usize,
        max_len: usize,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, StorageError>;

    async fn topic_affinities(&self, lang: &str) -> Result<BTreeMap<String, f64>, StorageError>;

    async fn topic_affinity(&self, lang: &str, topic_key: &str) -> Result<Option<f64>, StorageError>;

    async fn upsert_topic_affinity(&self, lang: &str, topic_key: &str, score: f64) -> Result<(), StorageError>;

    /// Topics of the most recently opened records, most recent first.
    async fn recent_topics(&self, limit: usize) -> Result<Vec<String>, StorageError>;

    async fn append_history(&self, entry: HistoryEntry) -> Result<(), StorageError>;
}
