use std::collections::BTreeMap;

use super::config::RankingWeights;
use crate::record::ContentRecord;

/// Inputs shared by every candidate in one ranking call.
pub struct ScoringContext<'a> {
    pub topic_affinity: &'a BTreeMap<String, f64>,
    /// Most recent first.
    pub recent_topics: &'a [String],
    pub level_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub interest: f64,
    pub novelty: f64,
    pub quality: f64,
    pub repetition_penalty: f64,
}

impl ScoreBreakdown {
    pub fn base(&self) -> f64 {
        self.interest + self.novelty + self.quality - self.repetition_penalty
    }
}

pub trait Scorer {
    fn score(&self, candidate: &ContentRecord, ctx: &ScoringContext<'_>) -> ScoreBreakdown;
}

/// Affinity, novelty, quality and repetition scoring on the candidate's topic key.
#[derive(Debug, Clone)]
pub struct AffinityScorer {
    weights: RankingWeights,
    cooldown_cards: usize,
}

impl AffinityScorer {
    pub fn new(weights: RankingWeights, cooldown_cards: usize) -> Self {
        Self { weights, cooldown_cards }
    }
}

impl Scorer for AffinityScorer {
    fn score(&self, candidate: &ContentRecord, ctx: &ScoringContext<'_>) -> ScoreBreakdown {
        let topic = candidate.topic_key.as_str();
        let affinity = ctx.topic_affinity.get(topic).copied().unwrap_or(0.0);
        let interest = affinity * self.weights.interest * ctx.level_factor;

        let in_cooldown = ctx
            .recent_topics
            .iter()
            .take(self.cooldown_cards)
            .any(|t| t == topic);
        let novelty = if in_cooldown {
            self.weights.novelty * 0.1
        } else {
            self.weights.novelty
        };

        let quality = candidate.quality_score * self.weights.quality;
        let repeats = ctx.recent_topics.iter().filter(|t| *t == topic).count();
        let repetition_penalty = repeats as f64 * self.weights.repetition_penalty * 0.25;

        ScoreBreakdown {
            interest,
            novelty,
            quality,
            repetition_penalty,
        }
    }
}
