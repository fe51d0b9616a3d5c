use serde::{Deserialize, Serialize};

use super::normalize::normalize_search;
use crate::types::PageId;

/// One article-sized unit of pack content, keyed by `page_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub page_id: PageId,
    pub lang: String,
    pub title: String,
    pub normalized_title: String,
    pub summary: String,
    pub url: String,
    pub topic_key: String,
    pub quality_score: f64,
    pub is_disambiguation: bool,
    pub source_rev_id: Option<i64>,
    pub updated_at: String,
}

/// Alternate title for a record. Replaced wholesale whenever its record is upserted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasRecord {
    pub page_id: PageId,
    pub lang: String,
    pub alias: String,
    pub normalized_alias: String,
}

impl AliasRecord {
    pub fn for_record(record: &ContentRecord, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        AliasRecord {
            page_id: record.page_id,
            lang: record.lang.clone(),
            normalized_alias: normalize_search(&alias),
            alias,
        }
    }
}
