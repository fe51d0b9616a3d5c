use super::normalize::normalize_topic_key;

const FALLBACK_TOPIC: &str = "general";

/// Maps a raw topic key (plus the text it came with) to the key used for ranking.
///
/// Keyword heuristics live outside this crate; implementations must be pure.
pub trait TopicClassifier: Send + Sync {
    fn normalize_topic(&self, raw_topic: &str, title: &str, summary: &str) -> String;
}

/// Trusts the pack's topic key, only normalizing its spelling.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyTopicClassifier;

impl TopicClassifier for KeyTopicClassifier {
    fn normalize_topic(&self, raw_topic: &str, _title: &str, _summary: &str) -> String {
        let key = normalize_topic_key(raw_topic);
        if key.is_empty() {
            FALLBACK_TOPIC.to_string()
        } else {
            key
        }
    }
}
