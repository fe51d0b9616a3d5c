mod common;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use pack_feed_core::manifest::{
    read_manifest, write_manifest, Compression, FileCodec, ManifestError, PackManifest,
};
use pack_feed_core::selection::{RankingConfig, RankingConfigError};
use pack_feed_core::sync::staging::{local_file_name, resolve_url, shard_file_name, staging_dir};
use pack_feed_core::sync::SyncConfig;
use pack_feed_core::types::PersonalizationLevel;
use serde_json::json;
use tempfile::tempdir;

use common::{manifest_json, ndjson, shard_line};

fn sample_manifest() -> PackManifest {
    let body = ndjson(&[shard_line(1, "Science", "science", &[])]);
    PackManifest::from_slice(&manifest_json(
        "en-core-1m",
        5,
        "gzip",
        &[("en-0001", "shards/en-0001.ndjson.gz", body.as_slice())],
        None,
    ))
    .unwrap()
}

#[test]
fn ranking_config_v1_defaults() {
    let config = RankingConfig::v1();
    assert_eq!(config, RankingConfig::default());
    assert_eq!(config.version, 1);
    assert_eq!(config.personalization.default_level, PersonalizationLevel::Low);
    assert_eq!(config.guardrails.window_size, 12);
    assert_eq!(config.search.max_results, 30);
    config.validate().unwrap();
}

#[test]
fn ranking_config_loads_from_json_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ranking.json");
    let payload = json!({
        "version": 2,
        "weights": { "interest": 0.5, "novelty": 0.1, "diversity": 0.1, "quality": 0.3, "repetitionPenalty": 0.1 },
        "personalization": {
            "defaultLevel": "MEDIUM",
            "levels": { "OFF": 0.0, "LOW": 0.5, "MEDIUM": 1.0 },
            "learningRates": { "open": 0.3, "hide": -0.4 },
            "dailyDriftCap": 0.1,
            "topicClamp": { "min": -0.5, "max": 0.5 }
        },
        "guardrails": {
            "explorationFloor": 0.2,
            "windowSize": 10,
            "maxSameTopicInWindow": 2,
            "minDistinctTopicsInWindow": 3,
            "cooldownCards": 2
        },
        "search": { "typoDistance": 1, "typoMinQueryLength": 4, "maxTypoCandidates": 50, "maxResults": 20 }
    });
    fs::write(&path, payload.to_string()).unwrap();

    let config = RankingConfig::load(&path).unwrap();
    assert_eq!(config.version, 2);
    assert_eq!(config.weights.repetition_penalty, 0.1);
    assert_eq!(config.personalization.default_level, PersonalizationLevel::Medium);
    // HIGH is absent from this file
    assert_eq!(config.personalization.level_factor(PersonalizationLevel::High), 0.0);
    assert_eq!(config.guardrails.max_same_topic_in_window, 2);
    assert_eq!(config.search.typo_min_query_length, 4);
}

#[test]
fn ranking_config_rejects_inverted_clamp() {
    let mut config = RankingConfig::v1();
    config.personalization.topic_clamp.min = 2.0;
    let payload = serde_json::to_string(&config).unwrap();
    assert!(matches!(
        RankingConfig::from_json_str(&payload),
        Err(RankingConfigError::Invalid(_))
    ));
    assert!(matches!(
        RankingConfig::from_json_str("{\"version\": 1}"),
        Err(RankingConfigError::Malformed(_))
    ));
    assert!(matches!(
        RankingConfig::load(Path::new("/definitely/not/here.json")),
        Err(RankingConfigError::Io(_))
    ));
}

#[test]
fn manifest_parses_with_unknown_fields_and_defaults() {
    let raw = json!({
        "packId": "en-core-1m",
        "language": "en",
        "version": 3,
        "createdAt": "2026-02-09T00:00:00Z",
        "recordCount": 2,
        "compression": "none",
        "shards": [],
        "publisher": "ignored"
    });
    let manifest = PackManifest::from_slice(raw.to_string().as_bytes()).unwrap();
    assert!(manifest.delta.is_none());
    assert!(manifest.pack_tags.is_empty());
    assert_eq!(manifest.attribution.license, "");
    assert_eq!(manifest.codec().unwrap(), Compression::None);
}

#[test]
fn compression_accepts_only_supported_values() {
    assert_eq!(Compression::parse("gzip"), Some(Compression::Gzip));
    assert_eq!(Compression::parse(" NONE "), Some(Compression::None));
    assert_eq!(Compression::parse("zstd"), None);
    assert_eq!(Compression::parse(""), None);

    let mut manifest = sample_manifest();
    manifest.compression = "brotli".to_string();
    assert!(matches!(manifest.codec(), Err(ManifestError::UnsupportedCompression(ref c)) if c == "brotli"));
}

#[test]
fn file_codec_follows_extension() {
    assert_eq!(FileCodec::for_path(Path::new("a/en-0001.ndjson")), FileCodec::Plain);
    assert_eq!(FileCodec::for_path(Path::new("a/en-0001.ndjson.GZ")), FileCodec::Gzip);
    assert_eq!(
        FileCodec::for_path(Path::new("delta.ndjson.zst")),
        FileCodec::Unsupported("zst".to_string())
    );
}

#[test]
fn signature_tracks_identifying_fields() {
    let manifest = sample_manifest();
    let signature = manifest.signature();
    assert_eq!(signature.len(), 64);
    assert_eq!(signature, sample_manifest().signature());

    let mut described = manifest.clone();
    described.description = Some("Core English articles".to_string());
    assert_eq!(described.signature(), signature);

    let mut rebuilt = manifest.clone();
    rebuilt.shards[0].sha256 = "0".repeat(64);
    assert_ne!(rebuilt.signature(), signature);
}

#[tokio::test]
async fn manifest_round_trips_through_directory() {
    let dir = tempdir().unwrap();
    let manifest = sample_manifest();
    write_manifest(dir.path(), &manifest).await.unwrap();

    assert_eq!(read_manifest(dir.path()).await.unwrap(), manifest);
    assert!(!dir.path().join("manifest.json.tmp").exists());
}

#[test]
fn staging_paths_are_sanitized() {
    let root = Path::new("/var/packs");
    assert_eq!(staging_dir(root, "en-core-1m", 5), root.join("en-core-1m/v5"));
    assert_eq!(staging_dir(root, "../etc", 1), root.join(".._etc/v1"));
    assert_eq!(staging_dir(root, "..", 1), root.join("pack/v1"));
}

#[test]
fn urls_resolve_against_manifest() {
    let manifest = "https://packs.example.org/en/manifest.json";
    assert_eq!(
        resolve_url(manifest, "shards/en-0001.ndjson.gz"),
        "https://packs.example.org/en/shards/en-0001.ndjson.gz"
    );
    assert_eq!(
        resolve_url(manifest, "https://cdn.example.org/x.ndjson"),
        "https://cdn.example.org/x.ndjson"
    );
    assert_eq!(local_file_name("https://cdn.example.org/a/x.ndjson.gz?sig=1", "f"), "x.ndjson.gz");
    assert_eq!(local_file_name("https://cdn.example.org/", "fallback.ndjson"), "fallback.ndjson");
}

#[test]
fn sync_config_defaults() {
    let config = SyncConfig::new("/tmp/staging");
    assert_eq!(config.batch_size, 1_000);
    assert_eq!(config.progress_interval().as_millis(), 200);
    assert!(!config.prune_staging);
    assert_eq!(config.staging_root(), Path::new("/tmp/staging"));
}

#[tokio::test]
async fn missing_manifest_is_reported() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        read_manifest(dir.path()).await,
        Err(ManifestError::Missing(_))
    ));
}

#[test]
fn repeated_shard_names_get_id_prefix() {
    let mut taken = BTreeSet::new();
    assert_eq!(shard_file_name("a/shard.ndjson.gz", "en-0001", &mut taken), "shard.ndjson.gz");
    assert_eq!(shard_file_name("b/shard.ndjson.gz", "en-0002", &mut taken), "en-0002-shard.ndjson.gz");
    assert_eq!(shard_file_name("c/shard.ndjson.gz", "en-0002", &mut taken), "en-0002-2-shard.ndjson.gz");
    assert_eq!(shard_file_name("https://cdn.example.org/", "en/0003", &mut taken), "en_0003.ndjson");
    assert_eq!(FileCodec::for_path(Path::new("en-0002-shard.ndjson.gz")), FileCodec::Gzip);
}
