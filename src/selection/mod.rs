pub mod affinity;
pub mod config;
pub mod explain;
pub mod guardrails;
pub mod ranking;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::record::ContentRecord;
use crate::types::{PageId, PersonalizationLevel};
use guardrails::{top_affinity_topics, TopicWindow};

pub use affinity::FeedbackEvent;
pub use config::{
    GuardrailsConfig, PersonalizationConfig, RankingConfig, RankingConfigError, RankingWeights, SearchConfig,
    TopicClamp,
};
pub use explain::SelectionWhy;
pub use ranking::{AffinityScorer, ScoreBreakdown, Scorer, ScoringContext};

/// A candidate chosen for the feed, in feed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub record: ContentRecord,
    pub score: f64,
    pub why: SelectionWhy,
}

struct ScoredCandidate<'a> {
    record: &'a ContentRecord,
    breakdown: ScoreBreakdown,
    score: f64,
}

/// Pure, synchronous feed ranking under topic-cap, distinct-topic and exploration guardrails.
pub struct RankingEngine<S = AffinityScorer> {
    config: RankingConfig,
    scorer: S,
}

impl RankingEngine<AffinityScorer> {
    pub fn new(config: RankingConfig) -> Self {
        let scorer = AffinityScorer::new(config.weights.clone(), config.guardrails.cooldown_cards);
        Self { config, scorer }
    }
}

impl<S> RankingEngine<S>
where
    S: Scorer,
{
    pub fn with_scorer(config: RankingConfig, scorer: S) -> Self {
        Self { config, scorer }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn rank(
        &self,
        candidates: &[ContentRecord],
        topic_affinity: &BTreeMap<String, f64>,
        recent_topics: &[String],
        level: PersonalizationLevel,
        limit: usize,
    ) -> Vec<RankedItem> {
        if candidates.is_empty() || limit == 0 {
            return Vec::new();
        }

        let guardrails = &self.config.guardrails;
        let ctx = ScoringContext {
            topic_affinity,
            recent_topics,
            level_factor: self.config.personalization.level_factor(level),
        };
        let top_topics = top_affinity_topics(topic_affinity);
        let is_exploration = |topic: &str| !top_topics.is_empty() && !top_topics.contains(topic);

        // 1. Scoring Phase
        let mut scored: Vec<ScoredCandidate<'_>> = candidates
            .iter()
            .map(|record| {
                let breakdown = self.scorer.score(record, &ctx);
                ScoredCandidate {
                    record,
                    score: breakdown.base(),
                    breakdown,
                }
            })
            .collect();

        // 2. Ordering Phase: score desc, page id asc
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.record.page_id.cmp(&b.record.page_id))
        });

        // 3. Guarded greedy selection
        let exploration_target = ((limit as f64 * guardrails.exploration_floor).floor() as usize).max(1);
        let mut window = TopicWindow::default();
        let mut selected_ids: BTreeSet<PageId> = BTreeSet::new();
        let mut selected_exploration = 0usize;
        let mut result = Vec::with_capacity(limit);

        for candidate in &scored {
            if result.len() >= limit {
                break;
            }
            let topic = candidate.record.topic_key.as_str();
            if window.topic_capped(topic, guardrails) || window.would_collapse_distinct(topic, guardrails) {
                continue;
            }
            let exploring = is_exploration(topic);
            let slots_remaining = limit - result.len();
            let exploration_needed = exploration_target.saturating_sub(selected_exploration);
            if !exploring && exploration_needed >= slots_remaining {
                continue;
            }

            result.push(self.accept(candidate, &window, exploring));
            window.push(topic);
            selected_ids.insert(candidate.record.page_id);
            if exploring {
                selected_exploration += 1;
            }
        }

        // 4. Fill pass: exploration quota relaxed, topic guardrails kept
        if result.len() < limit {
            for candidate in &scored {
                if result.len() >= limit {
                    break;
                }
                if selected_ids.contains(&candidate.record.page_id) {
                    continue;
                }
                let topic = candidate.record.topic_key.as_str();
                if window.topic_capped(topic, guardrails) || window.would_collapse_distinct(topic, guardrails) {
                    continue;
                }
                result.push(self.accept(candidate, &window, is_exploration(topic)));
                window.push(topic);
                selected_ids.insert(candidate.record.page_id);
            }
        }

        result.truncate(limit);
        result
    }

    fn accept(&self, candidate: &ScoredCandidate<'_>, window: &TopicWindow, exploring: bool) -> RankedItem {
        let topic = candidate.record.topic_key.as_str();
        let diversity = self.config.weights.diversity / (1 + window.count(topic)) as f64;
        let breakdown = candidate.breakdown;
        RankedItem {
            record: candidate.record.clone(),
            score: candidate.score + diversity,
            why: SelectionWhy {
                topic: topic.to_string(),
                interest: breakdown.interest,
                novelty: breakdown.novelty,
                quality: breakdown.quality,
                repetition_penalty: breakdown.repetition_penalty,
                diversity,
                is_exploration: exploring,
                summary: explain::summarize(topic, breakdown.interest, breakdown.novelty, diversity, exploring),
            },
        }
    }
}
