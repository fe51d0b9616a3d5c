use pack_feed_core::record::{
    normalize_search, normalize_topic_key, parse_flexible_bool, DecodeError, DeltaOp, DeltaRow, KeyTopicClassifier,
    ShardRow, TopicClassifier,
};
use pack_feed_core::types::PageId;
use serde_json::json;

#[test]
fn flexible_bool_accepts_every_documented_literal() {
    for literal in ["true", "TRUE", "1", "yes", "Yes", "y", "Y"] {
        assert!(parse_flexible_bool(literal).unwrap(), "{literal} should be true");
    }
    for literal in ["false", "False", "0", "no", "NO", "n", " n "] {
        assert!(!parse_flexible_bool(literal).unwrap(), "{literal} should be false");
    }
}

#[test]
fn flexible_bool_rejects_anything_else() {
    for literal in ["maybe", "2", "", "truthy", "-1"] {
        assert!(
            matches!(parse_flexible_bool(literal), Err(DecodeError::BoolLiteral(_))),
            "{literal:?} must be rejected"
        );
    }
}

fn shard_line(is_disambiguation: serde_json::Value) -> String {
    json!({
        "article": {
            "page_id": 42,
            "lang": "en",
            "title": "Alan  Turing",
            "summary": "Mathematician and computer scientist.",
            "wiki_url": "https://en.wikipedia.org/wiki/Alan_Turing",
            "topic_key": "Computer_Science",
            "quality_score": 0.93,
            "is_disambiguation": is_disambiguation,
            "updated_at": "2026-02-09T00:00:00Z"
        },
        "aliases": ["Turing", "A. M. Turing"]
    })
    .to_string()
}

#[test]
fn shard_row_decodes_flexible_disambiguation_flag() {
    for (raw, expected) in [(json!("yes"), true), (json!(0), false), (json!(true), true), (json!("N"), false)] {
        let row = ShardRow::decode(1, &shard_line(raw)).unwrap();
        assert_eq!(row.article.is_disambiguation, expected);
    }
}

#[test]
fn shard_row_rejects_unknown_bool_literal() {
    let err = ShardRow::decode(7, &shard_line(json!("sometimes"))).unwrap_err();
    assert!(matches!(err, DecodeError::Json { line: 7, .. }), "got {err:?}");
}

#[test]
fn shard_row_fills_normalized_title_and_topic() {
    let (record, aliases) = ShardRow::decode(1, &shard_line(json!(false)))
        .unwrap()
        .into_parts(&KeyTopicClassifier);

    assert_eq!(record.page_id, PageId::new(42));
    assert_eq!(record.normalized_title, "alan turing");
    assert_eq!(record.topic_key, "computer-science");
    assert_eq!(record.url, "https://en.wikipedia.org/wiki/Alan_Turing");
    assert_eq!(aliases.len(), 2);
    assert_eq!(aliases[1].normalized_alias, "a. m. turing");
    assert!(aliases.iter().all(|a| a.page_id == record.page_id && a.lang == "en"));
}

#[test]
fn delta_row_decodes_both_ops() {
    let upsert = json!({
        "op": "upsert",
        "record": {
            "page_id": 7,
            "lang": "en",
            "title": "Rome",
            "normalized_title": "rome",
            "summary": "Capital of Italy.",
            "wiki_url": "https://en.wikipedia.org/wiki/Rome",
            "topic_key": "history",
            "quality_score": 0.7,
            "updated_at": "2026-02-09T00:00:00Z"
        },
        "aliases": ["Roma"]
    })
    .to_string();
    match DeltaRow::decode(1, &upsert).unwrap() {
        DeltaOp::Upsert { article, aliases } => {
            assert_eq!(article.page_id, 7);
            assert!(!article.is_disambiguation);
            assert_eq!(aliases, vec!["Roma".to_string()]);
        }
        other => panic!("expected upsert, got {other:?}"),
    }

    let delete = json!({ "op": "delete", "page_id": 9 }).to_string();
    assert!(matches!(DeltaRow::decode(2, &delete).unwrap(), DeltaOp::Delete(id) if id == PageId::new(9)));
}

#[test]
fn delta_row_reports_unknown_op_and_missing_fields() {
    let unknown = json!({ "op": "merge", "page_id": 1 }).to_string();
    assert!(matches!(
        DeltaRow::decode(3, &unknown),
        Err(DecodeError::UnknownOp { line: 3, ref op }) if op == "merge"
    ));

    let missing = json!({ "op": "delete" }).to_string();
    assert!(matches!(
        DeltaRow::decode(4, &missing),
        Err(DecodeError::MissingField { line: 4, field: "page_id", .. })
    ));

    let missing_record = json!({ "op": "upsert" }).to_string();
    assert!(matches!(
        DeltaRow::decode(5, &missing_record),
        Err(DecodeError::MissingField { line: 5, field: "record", .. })
    ));
}

#[test]
fn normalization_compacts_whitespace_and_case() {
    assert_eq!(normalize_search("  Alan   Turing "), "alan turing");
    assert_eq!(normalize_search("ＡＢＣ"), "abc");
    assert_eq!(normalize_topic_key(" Natural_Sciences "), "natural-sciences");
    assert_eq!(normalize_topic_key("Visual Arts"), "visual-arts");
}

#[test]
fn key_classifier_falls_back_to_general() {
    assert_eq!(KeyTopicClassifier.normalize_topic("   ", "Title", "Summary"), "general");
}
