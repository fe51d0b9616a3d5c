use std::collections::{BTreeMap, BTreeSet};

use super::config::GuardrailsConfig;

/// Topics accepted so far in one ranking pass.
#[derive(Debug, Default)]
pub(crate) struct TopicWindow {
    counts: BTreeMap<String, usize>,
    selected: usize,
}

impl TopicWindow {
    pub(crate) fn count(&self, topic: &str) -> usize {
        self.counts.get(topic).copied().unwrap_or(0)
    }

    pub(crate) fn push(&mut self, topic: &str) {
        *self.counts.entry(topic.to_string()).or_insert(0) += 1;
        self.selected += 1;
    }

    pub(crate) fn topic_capped(&self, topic: &str, guardrails: &GuardrailsConfig) -> bool {
        self.count(topic) >= guardrails.max_same_topic_in_window
    }

    /// Whether accepting `topic` leaves too few slots for the window to reach its
    /// distinct-topic minimum.
    pub(crate) fn would_collapse_distinct(&self, topic: &str, guardrails: &GuardrailsConfig) -> bool {
        let window = guardrails.window_size;
        let min_distinct = guardrails.min_distinct_topics_in_window;
        if window == 0 || min_distinct == 0 || self.selected >= window {
            return false;
        }
        let next_distinct = if self.counts.contains_key(topic) {
            self.counts.len()
        } else {
            self.counts.len() + 1
        };
        let slots_after_pick = window - (self.selected + 1);
        next_distinct + slots_after_pick < min_distinct
    }
}

/// The two highest-affinity topics; ties resolve by topic key.
pub(crate) fn top_affinity_topics(affinity: &BTreeMap<String, f64>) -> BTreeSet<String> {
    let mut entries: Vec<(&String, f64)> = affinity.iter().map(|(k, v)| (k, *v)).collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries.into_iter().take(2).map(|(k, _)| k.clone()).collect()
}
