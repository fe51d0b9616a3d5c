pub mod downloader;
pub mod http;
pub mod network;
pub mod progress;

pub use downloader::ChunkedDownloader;
pub use http::{HttpClient, HttpConfig, HttpResponse, ReqwestClient};
pub use network::{BandwidthPolicy, NetworkMonitor, StaticNetwork};
pub use progress::{DownloadProgressSnapshot, DEFAULT_PROGRESS_INTERVAL};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Download requires an unmetered network")]
    PolicyBlocked,
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Response body exceeds {limit} bytes")]
    BodyTooLarge { limit: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Download cancelled")]
    Cancelled,
}
