use super::config::PersonalizationConfig;
use crate::types::PersonalizationLevel;

/// User signals that move topic affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEvent {
    Open,
    MoreLike,
    LessLike,
}

impl PersonalizationConfig {
    /// Missing levels count as personalization off.
    pub fn level_factor(&self, level: PersonalizationLevel) -> f64 {
        self.levels.get(level.name()).copied().unwrap_or(0.0)
    }

    pub fn learning_rate(&self, event: FeedbackEvent) -> f64 {
        let rate = |key: &str| self.learning_rates.get(key).copied();
        match event {
            FeedbackEvent::Open => rate("open").unwrap_or(0.0),
            FeedbackEvent::MoreLike => rate("like").or_else(|| rate("bookmark")).unwrap_or(0.7),
            FeedbackEvent::LessLike => rate("hide").unwrap_or(-0.5),
        }
    }

    /// Applies `delta` capped by the daily drift, then clamps into the topic range.
    pub fn next_affinity(&self, current: Option<f64>, delta: f64) -> f64 {
        let cap = self.daily_drift_cap;
        let bounded = delta.max(-cap).min(cap);
        let clamp = self.topic_clamp;
        (current.unwrap_or(0.0) + bounded).max(clamp.min).min(clamp.max)
    }
}
