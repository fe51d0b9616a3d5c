use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::PersonalizationLevel;

#[derive(Debug, Error)]
pub enum RankingConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed ranking config: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Invalid ranking config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingWeights {
    pub interest: f64,
    pub novelty: f64,
    pub diversity: f64,
    pub quality: f64,
    pub repetition_penalty: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopicClamp {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationConfig {
    pub default_level: PersonalizationLevel,
    pub levels: BTreeMap<String, f64>,
    pub learning_rates: BTreeMap<String, f64>,
    pub daily_drift_cap: f64,
    pub topic_clamp: TopicClamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailsConfig {
    pub exploration_floor: f64,
    /// `0` disables the distinct-topic guardrail.
    pub window_size: usize,
    pub max_same_topic_in_window: usize,
    /// `0` disables the distinct-topic guardrail.
    pub min_distinct_topics_in_window: usize,
    pub cooldown_cards: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    pub typo_distance: usize,
    pub typo_min_query_length: usize,
    pub max_typo_candidates: usize,
    pub max_results: usize,
}

/// Weights, personalization and guardrails driving the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    pub version: u32,
    pub weights: RankingWeights,
    pub personalization: PersonalizationConfig,
    pub guardrails: GuardrailsConfig,
    pub search: SearchConfig,
}

impl RankingConfig {
    pub fn v1() -> Self {
        Self {
            version: 1,
            weights: RankingWeights {
                interest: 0.4,
                novelty: 0.2,
                diversity: 0.1,
                quality: 0.2,
                repetition_penalty: 0.2,
            },
            personalization: PersonalizationConfig {
                default_level: PersonalizationLevel::Low,
                levels: [("OFF", 0.0), ("LOW", 0.5), ("MEDIUM", 1.0), ("HIGH", 1.5)]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                learning_rates: [("open", 0.4), ("like", 0.7), ("hide", -0.5)]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                daily_drift_cap: 0.2,
                topic_clamp: TopicClamp { min: -1.0, max: 1.0 },
            },
            guardrails: GuardrailsConfig {
                exploration_floor: 0.25,
                window_size: 12,
                max_same_topic_in_window: 3,
                min_distinct_topics_in_window: 4,
                cooldown_cards: 3,
            },
            search: SearchConfig {
                typo_distance: 1,
                typo_min_query_length: 5,
                max_typo_candidates: 200,
                max_results: 30,
            },
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, RankingConfigError> {
        let config: RankingConfig = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, RankingConfigError> {
        let payload = std::fs::read_to_string(path)?;
        Self::from_json_str(&payload)
    }

    pub fn validate(&self) -> Result<(), RankingConfigError> {
        let clamp = self.personalization.topic_clamp;
        if !(clamp.min <= clamp.max) {
            return Err(RankingConfigError::Invalid(format!(
                "topicClamp.min {} exceeds max {}",
                clamp.min, clamp.max
            )));
        }
        if !(self.personalization.daily_drift_cap >= 0.0) {
            return Err(RankingConfigError::Invalid("dailyDriftCap must be non-negative".into()));
        }
        if !(0.0..=1.0).contains(&self.guardrails.exploration_floor) {
            return Err(RankingConfigError::Invalid("explorationFloor must be within [0, 1]".into()));
        }
        Ok(())
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self::v1()
    }
}
