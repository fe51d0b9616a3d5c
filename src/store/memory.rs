use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::batch::IngestBatch;
use super::contract::{ContentStore, HistoryEntry, StorageError};
use crate::record::{AliasRecord, ContentRecord};
use crate::types::PageId;

#[derive(Debug, Clone)]
struct StoredRecord {
    record: ContentRecord,
    ingested_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredAffinity {
    score: f64,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: BTreeMap<PageId, StoredRecord>,
    aliases: BTreeMap<PageId, Vec<AliasRecord>>,
    affinity: BTreeMap<(String, String), StoredAffinity>,
    history: Vec<HistoryEntry>,
}

/// Single-writer in-memory implementation of [`ContentStore`].
///
/// Every call holds the lock for its whole duration, so a batch is applied atomically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `page_id` was last written by an ingestion batch.
    pub fn ingested_at(&self, page_id: PageId) -> Option<DateTime<Utc>> {
        self.state.read().records.get(&page_id).map(|r| r.ingested_at)
    }

    pub fn affinity_updated_at(&self, lang: &str, topic_key: &str) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .affinity
            .get(&(lang.to_string(), topic_key.to_string()))
            .map(|a| a.updated_at)
    }

    pub fn all_records(&self) -> Vec<ContentRecord> {
        self.state.read().records.values().map(|r| r.record.clone()).collect()
    }

    pub fn alias_count(&self) -> usize {
        self.state.read().aliases.values().map(Vec::len).sum()
    }

    fn select_where<F>(&self, lang: &str, limit: usize, keep: F) -> Vec<ContentRecord>
    where
        F: Fn(&ContentRecord) -> bool,
    {
        self.state
            .read()
            .records
            .values()
            .map(|r| &r.record)
            .filter(|r| r.lang == lang && keep(r))
            .take(limit)
            .cloned()
            .collect()
    }
}

fn by_quality_desc(a: &ContentRecord, b: &ContentRecord) -> Ordering {
    b.quality_score
        .partial_cmp(&a.quality_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.page_id.cmp(&b.page_id))
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn apply_batch(&self, batch: &IngestBatch) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut state = self.state.write();

        for record in &batch.upserts {
            state.records.insert(
                record.page_id,
                StoredRecord {
                    record: record.clone(),
                    ingested_at: now,
                },
            );
        }
        for page_id in batch.upserted_page_ids() {
            state.aliases.remove(&page_id);
        }
        for alias in &batch.aliases {
            let rows = state.aliases.entry(alias.page_id).or_default();
            // (page_id, lang, normalized_alias) is unique
            rows.retain(|row| !(row.lang == alias.lang && row.normalized_alias == alias.normalized_alias));
            rows.push(alias.clone());
        }
        for page_id in &batch.deletes {
            state.records.remove(page_id);
            state.aliases.remove(page_id);
        }
        Ok(())
    }

    async fn record(&self, page_id: PageId) -> Result<Option<ContentRecord>, StorageError> {
        Ok(self.state.read().records.get(&page_id).map(|r| r.record.clone()))
    }

    async fn aliases(&self, page_id: PageId) -> Result<Vec<AliasRecord>, StorageError> {
        Ok(self.state.read().aliases.get(&page_id).cloned().unwrap_or_default())
    }

    async fn record_count(&self, lang: &str) -> Result<usize, StorageError> {
        Ok(self
            .state
            .read()
            .records
            .values()
            .filter(|r| r.record.lang == lang && !r.record.is_disambiguation)
            .count())
    }

    async fn feed_candidates(&self, lang: &str, limit: usize) -> Result<Vec<ContentRecord>, StorageError> {
        let mut rows = self.select_where(lang, usize::MAX, |r| !r.is_disambiguation);
        rows.sort_by(by_quality_desc);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn search_exact_title(
        &self,
        lang: &str,
        normalized_query: &str,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, StorageError> {
        Ok(self.select_where(lang, limit, |r| r.normalized_title == normalized_query))
    }

    async fn search_title_prefix(
        &self,
        lang: &str,
        normalized_prefix: &str,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, StorageError> {
        let mut rows = self.select_where(lang, usize::MAX, |r| r.normalized_title.starts_with(normalized_prefix));
        rows.sort_by(|a, b| a.normalized_title.cmp(&b.normalized_title));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn search_alias(
        &self,
        lang: &str,
        normalized_query: &str,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, StorageError> {
        let state = self.state.read();
        let mut hits: Vec<(&str, &ContentRecord)> = state
            .aliases
            .values()
            .flatten()
            .filter(|a| a.lang == lang && a.normalized_alias.starts_with(normalized_query))
            .filter_map(|a| {
                state
                    .records
                    .get(&a.page_id)
                    .map(|r| (a.normalized_alias.as_str(), &r.record))
            })
            .collect();
        hits.sort_by(|a, b| a.0.cmp(b.0));
        Ok(hits.into_iter().take(limit).map(|(_, r)| r.clone()).collect())
    }

    async fn typo_candidates(
        &self,
        lang: &str,
        first_char: char,
        min_len: usize,
        max_len: usize,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, StorageError> {
        let mut rows = self.select_where(lang, usize::MAX, |r| {
            let len = r.normalized_title.chars().count();
            r.normalized_title.starts_with(first_char) && (min_len..=max_len).contains(&len)
        });
        rows.sort_by(by_quality_desc);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn topic_affinities(&self, lang: &str) -> Result<BTreeMap<String, f64>, StorageError> {
        Ok(self
            .state
            .read()
            .affinity
            .iter()
            .filter(|((l, _), _)| l == lang)
            .map(|((_, topic), a)| (topic.clone(), a.score))
            .collect())
    }

    async fn topic_affinity(&self, lang: &str, topic_key: &str) -> Result<Option<f64>, StorageError> {
        Ok(self
            .state
            .read()
            .affinity
            .get(&(lang.to_string(), topic_key.to_string()))
            .map(|a| a.score))
    }

    async fn upsert_topic_affinity(&self, lang: &str, topic_key: &str, score: f64) -> Result<(), StorageError> {
        if !score.is_finite() {
            return Err(StorageError::Constraint(format!(
                "affinity for {lang}/{topic_key} must be finite"
            )));
        }
        self.state.write().affinity.insert(
            (lang.to_string(), topic_key.to_string()),
            StoredAffinity {
                score,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn recent_topics(&self, limit: usize) -> Result<Vec<String>, StorageError> {
        let state = self.state.read();
        let mut entries: Vec<&HistoryEntry> = state.history.iter().collect();
        // stable: among equal timestamps the later append wins
        entries.reverse();
        entries.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        Ok(entries.into_iter().take(limit).map(|e| e.topic_key.clone()).collect())
    }

    async fn append_history(&self, entry: HistoryEntry) -> Result<(), StorageError> {
        self.state.write().history.push(entry);
        Ok(())
    }
}
