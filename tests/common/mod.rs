#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use pack_feed_core::record::ContentRecord;
use pack_feed_core::transfer::{HttpClient, HttpResponse, TransferError};
use pack_feed_core::types::PageId;
use parking_lot::Mutex;
use serde_json::json;
use sha2::{Digest, Sha256};

const CHUNK: usize = 1024;

/// In-memory HTTP origin with range support and fault injection.
#[derive(Default)]
pub struct FakeHttp {
    files: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<(String, Option<u64>)>>,
    failures: Mutex<HashMap<String, usize>>,
    interruptions: Mutex<HashMap<String, (usize, usize)>>,
    reported_lengths: Mutex<HashMap<String, Option<u64>>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.files.lock().insert(url.to_string(), body.into());
    }

    /// Serves `body` without a `Content-Length`.
    pub fn serve_unsized(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.serve(url, body);
        self.reported_lengths.lock().insert(url.to_string(), None);
    }

    /// Reports `length` as the `Content-Length` of `url` whatever the body is.
    pub fn claim_length(&self, url: &str, length: u64) {
        self.reported_lengths.lock().insert(url.to_string(), Some(length));
    }

    /// The next `times` requests for `url` fail before any response.
    pub fn fail(&self, url: &str, times: usize) {
        self.failures.lock().insert(url.to_string(), times);
    }

    /// The next `times` responses for `url` break off after `after_bytes` body bytes.
    pub fn interrupt(&self, url: &str, after_bytes: usize, times: usize) {
        self.interruptions.lock().insert(url.to_string(), (after_bytes, times));
    }

    pub fn requests(&self) -> Vec<(String, Option<u64>)> {
        self.requests.lock().clone()
    }

    pub fn requests_for(&self, url: &str) -> Vec<Option<u64>> {
        self.requests
            .lock()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, range)| *range)
            .collect()
    }

    fn take_failure(&self, url: &str) -> bool {
        let mut failures = self.failures.lock();
        match failures.get_mut(url) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        }
    }

    fn take_interruption(&self, url: &str) -> Option<usize> {
        let mut interruptions = self.interruptions.lock();
        match interruptions.get_mut(url) {
            Some((after, left)) if *left > 0 => {
                *left -= 1;
                Some(*after)
            }
            _ => None,
        }
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn get(&self, url: &str, range_start: Option<u64>) -> Result<HttpResponse, TransferError> {
        self.requests.lock().push((url.to_string(), range_start));
        if self.take_failure(url) {
            return Err(TransferError::Network(format!("simulated failure for {url}")));
        }
        let Some(file) = self.files.lock().get(url).cloned() else {
            return Ok(response(404, Vec::new(), Some(0), None));
        };

        let (status, body) = match range_start {
            Some(start) if start as usize >= file.len() => return Ok(response(416, Vec::new(), Some(0), None)),
            Some(start) => (206, file[start as usize..].to_vec()),
            None => (200, file),
        };
        let content_length = match self.reported_lengths.lock().get(url) {
            Some(reported) => *reported,
            None => Some(body.len() as u64),
        };
        Ok(response(status, body, content_length, self.take_interruption(url)))
    }
}

fn response(status: u16, body: Vec<u8>, content_length: Option<u64>, cut_after: Option<usize>) -> HttpResponse {
    let served = match cut_after {
        Some(limit) => body[..limit.min(body.len())].to_vec(),
        None => body,
    };
    let mut chunks: Vec<Result<Vec<u8>, TransferError>> =
        served.chunks(CHUNK).map(|c| Ok(c.to_vec())).collect();
    if cut_after.is_some() {
        chunks.push(Err(TransferError::Network("connection reset".into())));
    }
    HttpResponse {
        status,
        content_length,
        body: stream::iter(chunks).boxed(),
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn article(page_id: i64, title: &str, topic: &str) -> serde_json::Value {
    json!({
        "page_id": page_id,
        "lang": "en",
        "title": title,
        "normalized_title": title.to_lowercase(),
        "summary": format!("Summary of {title}."),
        "wiki_url": format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
        "topic_key": topic,
        "quality_score": 0.8,
        "is_disambiguation": false,
        "updated_at": "2026-02-09T00:00:00Z"
    })
}

pub fn shard_line(page_id: i64, title: &str, topic: &str, aliases: &[&str]) -> String {
    json!({ "article": article(page_id, title, topic), "aliases": aliases }).to_string()
}

pub fn upsert_line(page_id: i64, title: &str, topic: &str, aliases: &[&str]) -> String {
    json!({ "op": "upsert", "record": article(page_id, title, topic), "aliases": aliases }).to_string()
}

pub fn delete_line(page_id: i64) -> String {
    json!({ "op": "delete", "page_id": page_id }).to_string()
}

pub fn ndjson(lines: &[String]) -> Vec<u8> {
    let mut out = lines.join("\n");
    out.push('\n');
    out.into_bytes()
}

pub fn manifest_json(
    pack_id: &str,
    version: u64,
    compression: &str,
    shards: &[(&str, &str, &[u8])],
    delta: Option<serde_json::Value>,
) -> Vec<u8> {
    let shards: Vec<serde_json::Value> = shards
        .iter()
        .map(|(id, url, body)| {
            json!({
                "id": id,
                "url": url,
                "sha256": sha256_hex(body),
                "records": body.iter().filter(|b| **b == b'\n').count(),
                "bytes": body.len(),
            })
        })
        .collect();
    let mut manifest = json!({
        "packId": pack_id,
        "language": "en",
        "version": version,
        "createdAt": "2026-02-09T00:00:00Z",
        "recordCount": 0,
        "compression": compression,
        "shards": shards,
        "attribution": {
            "source": "Wikipedia",
            "license": "CC BY-SA 4.0",
            "licenseUrl": "https://creativecommons.org/licenses/by-sa/4.0/",
            "requiredNotice": "Content from Wikipedia."
        }
    });
    if let Some(delta) = delta {
        manifest["delta"] = delta;
    }
    serde_json::to_vec(&manifest).unwrap()
}

pub fn record(page_id: i64, topic: &str, quality: f64) -> ContentRecord {
    ContentRecord {
        page_id: PageId::new(page_id),
        lang: "en".to_string(),
        title: format!("Card {page_id}"),
        normalized_title: format!("card {page_id}"),
        summary: format!("Sufficiently long summary for card {page_id} in topic {topic}."),
        url: format!("https://en.wikipedia.org/wiki/Card_{page_id}"),
        topic_key: topic.to_string(),
        quality_score: quality,
        is_disambiguation: false,
        source_rev_id: None,
        updated_at: "2026-02-09T00:00:00Z".to_string(),
    }
}
