use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::codec::Compression;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Malformed manifest: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Manifest not found: {0}")]
    Missing(String),
    #[error("Manifest packId {actual} does not match expected {expected}")]
    PackIdMismatch { expected: String, actual: String },
    #[error("Unsupported pack compression '{0}'")]
    UnsupportedCompression(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackShard {
    pub id: String,
    pub url: String,
    pub sha256: String,
    pub records: u64,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackDelta {
    pub base_version: u64,
    pub target_version: u64,
    pub url: String,
    pub sha256: String,
    pub ops: u64,
}

impl PackDelta {
    pub fn applies_to(&self, installed_version: u64) -> bool {
        self.base_version == installed_version
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackAttribution {
    pub source: String,
    pub license: String,
    pub license_url: String,
    pub required_notice: String,
}

/// Metadata document describing one version of a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackManifest {
    pub pack_id: String,
    pub language: String,
    pub version: u64,
    pub created_at: String,
    pub record_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub pack_tags: Vec<String>,
    pub compression: String,
    pub shards: Vec<PackShard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<PackDelta>,
    #[serde(default)]
    pub topic_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub entity_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub sample_keywords: Vec<String>,
    #[serde(default)]
    pub attribution: PackAttribution,
}

impl PackManifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn codec(&self) -> Result<Compression, ManifestError> {
        Compression::parse(&self.compression)
            .ok_or_else(|| ManifestError::UnsupportedCompression(self.compression.clone()))
    }

    pub fn total_bytes(&self) -> u64 {
        self.shards.iter().map(|s| s.bytes).sum()
    }

    /// Hex SHA-256 over the fields that identify a published pack build.
    pub fn signature(&self) -> String {
        let mut raw = format!(
            "{}|{}|{}|{}|{}|{}|{}|",
            self.pack_id,
            self.language,
            self.version,
            self.created_at,
            self.record_count,
            self.compression,
            self.shards.len()
        );
        for shard in &self.shards {
            raw.push_str(&format!(
                "{}:{}:{}:{};",
                shard.id, shard.records, shard.bytes, shard.sha256
            ));
        }
        if let Some(delta) = &self.delta {
            raw.push_str(&format!(
                "|delta:{}:{}:{}",
                delta.base_version, delta.target_version, delta.sha256
            ));
        }
        let mut hasher = Sha256::new();
        hasher.update(raw.as_bytes());
        hex::encode(hasher.finalize())
    }
}
