//! Versioned content pack synchronization and personalized feed ranking.
//!
//! `pack-feed-core` keeps an on-device content corpus current and serves a ranked
//! feed from it. The sync side fetches a pack manifest, picks an incremental delta
//! or a full-shard install, downloads resumably, verifies SHA-256 checksums and
//! ingests records in bounded atomic batches. The ranking side scores candidates
//! against learned topic affinities under hard diversity and exploration guardrails.
//!
//! Storage, HTTP, network state and topic classification are injected through
//! traits ([`store::ContentStore`], [`transfer::HttpClient`],
//! [`transfer::NetworkMonitor`], [`record::TopicClassifier`]).

pub mod feed;
pub mod ingest;
pub mod integrity;
pub mod manifest;
pub mod record;
pub mod search;
pub mod selection;
pub mod store;
pub mod sync;
pub mod transfer;
pub mod types;
