use std::collections::BTreeSet;

use super::edit_distance::edit_distance_at_most_one;
use crate::record::{normalize_search, ContentRecord};
use crate::selection::SearchConfig;
use crate::store::{ContentStore, StorageError};

/// Exact, prefix and alias matches, then single-typo matches for long enough queries.
///
/// Results keep that precedence, are deduplicated by page id and capped at `max_results`.
pub async fn search_by_title(
    store: &dyn ContentStore,
    config: &SearchConfig,
    lang: &str,
    query: &str,
) -> Result<Vec<ContentRecord>, StorageError> {
    let normalized = normalize_search(query);
    if normalized.is_empty() {
        return Ok(Vec::new());
    }

    let max_results = config.max_results;
    let mut seen = BTreeSet::new();
    let mut combined = Vec::new();

    let exact = store.search_exact_title(lang, &normalized, max_results).await?;
    let prefix = store.search_title_prefix(lang, &normalized, max_results).await?;
    let alias = store.search_alias(lang, &normalized, max_results).await?;
    for row in exact.into_iter().chain(prefix).chain(alias) {
        if seen.insert(row.page_id) {
            combined.push(row);
        }
    }

    let query_len = normalized.chars().count();
    if query_len >= config.typo_min_query_length {
        if let Some(first_char) = normalized.chars().next() {
            let candidates = store
                .typo_candidates(
                    lang,
                    first_char,
                    query_len.saturating_sub(config.typo_distance),
                    query_len + config.typo_distance,
                    config.max_typo_candidates,
                )
                .await?;
            for row in candidates {
                if !seen.contains(&row.page_id) && edit_distance_at_most_one(&normalized, &row.normalized_title) {
                    seen.insert(row.page_id);
                    combined.push(row);
                }
            }
        }
    }

    combined.truncate(max_results);
    Ok(combined)
}
