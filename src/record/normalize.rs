use unicode_normalization::UnicodeNormalization;

/// NFKC, lowercase, trim, collapse internal whitespace to single spaces.
pub fn normalize_search(value: &str) -> String {
    let nfkc = value.nfkc().collect::<String>().to_lowercase();
    nfkc.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Topic keys are compared in hyphenated lowercase form.
pub fn normalize_topic_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace('_', "-")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
