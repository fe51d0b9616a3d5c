use std::sync::Arc;

use chrono::Utc;

use crate::record::ContentRecord;
use crate::search::search_by_title;
use crate::selection::{FeedbackEvent, RankedItem, RankingConfig, RankingEngine};
use crate::store::{ContentStore, HistoryEntry, StorageError};
use crate::types::PersonalizationLevel;

pub const FEED_CANDIDATE_POOL: usize = 250;

/// Reads candidates and affinity from the store and ranks them; records feedback.
pub struct FeedService {
    store: Arc<dyn ContentStore>,
    engine: RankingEngine,
}

impl FeedService {
    pub fn new(store: Arc<dyn ContentStore>, config: RankingConfig) -> Self {
        Self {
            store,
            engine: RankingEngine::new(config),
        }
    }

    pub fn config(&self) -> &RankingConfig {
        self.engine.config()
    }

    pub async fn load_feed(
        &self,
        lang: &str,
        level: PersonalizationLevel,
        limit: usize,
    ) -> Result<Vec<RankedItem>, StorageError> {
        let candidates = self.store.feed_candidates(lang, FEED_CANDIDATE_POOL).await?;
        let affinity = self.store.topic_affinities(lang).await?;
        let recent = self
            .store
            .recent_topics(self.config().guardrails.window_size)
            .await?;
        let ranked = self.engine.rank(&candidates, &affinity, &recent, level, limit);
        tracing::debug!(lang, candidates = candidates.len(), ranked = ranked.len(), "feed ranked");
        Ok(ranked)
    }

    pub async fn search_by_title(&self, lang: &str, query: &str) -> Result<Vec<ContentRecord>, StorageError> {
        search_by_title(self.store.as_ref(), &self.config().search, lang, query).await
    }

    /// Appends to reading history and nudges the topic's affinity.
    pub async fn record_open(&self, record: &ContentRecord, level: PersonalizationLevel) -> Result<(), StorageError> {
        self.store
            .append_history(HistoryEntry {
                page_id: record.page_id,
                topic_key: record.topic_key.clone(),
                opened_at: Utc::now(),
            })
            .await?;
        self.record_feedback(record, FeedbackEvent::Open, level).await
    }

    pub async fn record_more_like(
        &self,
        record: &ContentRecord,
        level: PersonalizationLevel,
    ) -> Result<(), StorageError> {
        self.record_feedback(record, FeedbackEvent::MoreLike, level).await
    }

    pub async fn record_less_like(
        &self,
        record: &ContentRecord,
        level: PersonalizationLevel,
    ) -> Result<(), StorageError> {
        self.record_feedback(record, FeedbackEvent::LessLike, level).await
    }

    async fn record_feedback(
        &self,
        record: &ContentRecord,
        event: FeedbackEvent,
        level: PersonalizationLevel,
    ) -> Result<(), StorageError> {
        let personalization = &self.config().personalization;
        let level_factor = personalization.level_factor(level);
        if level_factor <= 0.0 {
            return Ok(());
        }
        let delta = personalization.learning_rate(event) * level_factor;
        let current = self.store.topic_affinity(&record.lang, &record.topic_key).await?;
        let next = personalization.next_affinity(current, delta);
        self.store
            .upsert_topic_affinity(&record.lang, &record.topic_key, next)
            .await?;
        tracing::debug!(
            topic = %record.topic_key,
            ?event,
            previous = ?current,
            next,
            "topic affinity updated"
        );
        Ok(())
    }
}
