use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::RANGE;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::TransferError;

const USER_AGENT: &str = concat!("pack-feed-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 15_000,
            request_timeout_ms: 120_000,
        }
    }
}

pub struct HttpResponse {
    pub status: u16,
    pub content_length: Option<u64>,
    pub body: BoxStream<'static, Result<Vec<u8>, TransferError>>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Collects the body, failing once it exceeds `max_bytes`.
    ///
    /// The reported length is only a hint; it never sizes an allocation beyond `max_bytes`.
    pub async fn into_bytes(mut self, max_bytes: usize) -> Result<Vec<u8>, TransferError> {
        let limit = max_bytes as u64;
        if self.content_length.is_some_and(|len| len > limit) {
            return Err(TransferError::BodyTooLarge { limit });
        }
        let hint = self.content_length.unwrap_or(0).min(limit) as usize;
        let mut out = Vec::with_capacity(hint);
        while let Some(chunk) = self.body.next().await {
            let chunk = chunk?;
            if out.len() + chunk.len() > max_bytes {
                return Err(TransferError::BodyTooLarge { limit });
            }
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }
}

/// Plain GET with an optional `Range: bytes=<start>-` header.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, range_start: Option<u64>) -> Result<HttpResponse, TransferError>;
}

pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(config: &HttpConfig) -> Result<Self, TransferError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, range_start: Option<u64>) -> Result<HttpResponse, TransferError> {
        let mut request = self.client.get(url);
        if let Some(start) = range_start {
            request = request.header(RANGE, format!("bytes={start}-"));
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(TransferError::from))
            .boxed();
        Ok(HttpResponse {
            status,
            content_length,
            body,
        })
    }
}
