use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable unique key of a content record across pack versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(i64);

impl PageId {
    pub fn new(raw: i64) -> Self {
        PageId(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for PageId {
    fn from(raw: i64) -> Self {
        PageId(raw)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase hex SHA-256 of a full artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

impl ContentDigest {
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self::from_hasher(hasher)
    }

    pub(crate) fn from_hasher(hasher: Sha256) -> Self {
        let hash = hasher.finalize();
        ContentDigest(hex::encode(hash))
    }

    /// Case-insensitive comparison against a manifest-supplied hex digest.
    pub fn matches(&self, expected_hex: &str) -> bool {
        self.0.eq_ignore_ascii_case(expected_hex.trim())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How strongly learned topic affinities steer the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PersonalizationLevel {
    Off,
    Low,
    Medium,
    High,
}

impl PersonalizationLevel {
    /// Key used in `personalization.levels` of the ranking config.
    pub fn name(self) -> &'static str {
        match self {
            PersonalizationLevel::Off => "OFF",
            PersonalizationLevel::Low => "LOW",
            PersonalizationLevel::Medium => "MEDIUM",
            PersonalizationLevel::High => "HIGH",
        }
    }
}
