use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::content::{AliasRecord, ContentRecord};
use super::normalize::normalize_search;
use super::topic::TopicClassifier;
use crate::types::PageId;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unknown delta op '{op}' on line {line}")]
    UnknownOp { line: usize, op: String },
    #[error("Delta op '{op}' on line {line} is missing '{field}'")]
    MissingField {
        line: usize,
        op: &'static str,
        field: &'static str,
    },
    #[error("Unsupported boolean value: '{0}'")]
    BoolLiteral(String),
}

/// Accepts `true/false`, `1/0`, `yes/no`, `y/n` in any case.
pub fn parse_flexible_bool(literal: &str) -> Result<bool, DecodeError> {
    match literal.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(DecodeError::BoolLiteral(literal.to_string())),
    }
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Ok(flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(D::Error::custom(DecodeError::BoolLiteral(number.to_string()))),
        },
        Value::String(text) => parse_flexible_bool(&text).map_err(D::Error::custom),
        other => Err(D::Error::custom(DecodeError::BoolLiteral(other.to_string()))),
    }
}

/// Article payload shared by shard rows and delta upserts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardArticle {
    pub page_id: i64,
    pub lang: String,
    pub title: String,
    #[serde(default)]
    pub normalized_title: String,
    pub summary: String,
    pub wiki_url: String,
    pub topic_key: String,
    pub quality_score: f64,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_disambiguation: bool,
    #[serde(default)]
    pub source_rev_id: Option<i64>,
    pub updated_at: String,
}

impl ShardArticle {
    pub fn into_record(self, classifier: &dyn TopicClassifier) -> ContentRecord {
        let normalized_title = if self.normalized_title.trim().is_empty() {
            normalize_search(&self.title)
        } else {
            self.normalized_title
        };
        let topic_key = classifier.normalize_topic(&self.topic_key, &self.title, &self.summary);
        ContentRecord {
            page_id: PageId::new(self.page_id),
            lang: self.lang,
            title: self.title,
            normalized_title,
            summary: self.summary,
            url: self.wiki_url,
            topic_key,
            quality_score: self.quality_score,
            is_disambiguation: self.is_disambiguation,
            source_rev_id: self.source_rev_id,
            updated_at: self.updated_at,
        }
    }
}

/// One line of a full shard file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardRow {
    pub article: ShardArticle,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ShardRow {
    pub fn decode(line_no: usize, line: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(line).map_err(|source| DecodeError::Json {
            line: line_no,
            source,
        })
    }

    pub fn into_parts(self, classifier: &dyn TopicClassifier) -> (ContentRecord, Vec<AliasRecord>) {
        let record = self.article.into_record(classifier);
        let aliases = self
            .aliases
            .into_iter()
            .map(|alias| AliasRecord::for_record(&record, alias))
            .collect();
        (record, aliases)
    }
}

/// One line of a delta file, as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaRow {
    pub op: String,
    #[serde(default)]
    pub record: Option<ShardArticle>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub page_id: Option<i64>,
}

/// A decoded, validated delta operation.
#[derive(Debug, Clone)]
pub enum DeltaOp {
    Upsert {
        article: ShardArticle,
        aliases: Vec<String>,
    },
    Delete(PageId),
}

impl DeltaRow {
    pub fn decode(line_no: usize, line: &str) -> Result<DeltaOp, DecodeError> {
        let row: DeltaRow = serde_json::from_str(line).map_err(|source| DecodeError::Json {
            line: line_no,
            source,
        })?;
        match row.op.as_str() {
            "upsert" => {
                let article = row.record.ok_or(DecodeError::MissingField {
                    line: line_no,
                    op: "upsert",
                    field: "record",
                })?;
                Ok(DeltaOp::Upsert {
                    article,
                    aliases: row.aliases,
                })
            }
            "delete" => {
                let page_id = row.page_id.ok_or(DecodeError::MissingField {
                    line: line_no,
                    op: "delete",
                    field: "page_id",
                })?;
                Ok(DeltaOp::Delete(PageId::new(page_id)))
            }
            _ => Err(DecodeError::UnknownOp {
                line: line_no,
                op: row.op,
            }),
        }
    }
}
