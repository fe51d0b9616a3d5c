use serde::{Deserialize, Serialize};

const INTEREST_THRESHOLD: f64 = 0.15;

/// Score components behind a ranked item, plus the sentence shown to the reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionWhy {
    pub topic: String,
    pub interest: f64,
    pub novelty: f64,
    pub quality: f64,
    pub repetition_penalty: f64,
    pub diversity: f64,
    pub is_exploration: bool,
    pub summary: String,
}

pub(crate) fn summarize(topic: &str, interest: f64, novelty: f64, diversity: f64, is_exploration: bool) -> String {
    let mut reasons = Vec::new();
    if interest > INTEREST_THRESHOLD {
        reasons.push(format!("you've shown interest in {} topics", topic.replace('-', " ")));
    }
    if novelty > 0.0 {
        reasons.push("it adds novelty to avoid repetition".to_string());
    }
    if diversity > 0.0 {
        reasons.push("it improves topic diversity in your feed".to_string());
    }
    if is_exploration {
        reasons.push("it keeps a healthy exploration ratio".to_string());
    }
    if reasons.is_empty() {
        reasons.push("it is a strong quality candidate".to_string());
    }
    format!("Shown because {}.", reasons.join("; "))
}
