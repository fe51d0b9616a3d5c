use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::Sender;

use super::http::{HttpClient, HttpResponse};
use super::network::{BandwidthPolicy, NetworkMonitor};
use super::progress::{offer, DownloadProgressSnapshot, ProgressTracker, DEFAULT_PROGRESS_INTERVAL};
use super::TransferError;

const PARTIAL_CONTENT: u16 = 206;
const RANGE_NOT_SATISFIABLE: u16 = 416;

/// Resumable single-file fetcher.
///
/// One transfer at a time; an interrupted transfer leaves its partial file in place
/// so the next call can continue with a range request.
pub struct ChunkedDownloader {
    client: Arc<dyn HttpClient>,
    network: Arc<dyn NetworkMonitor>,
    progress_interval: Duration,
}

impl ChunkedDownloader {
    pub fn new(client: Arc<dyn HttpClient>, network: Arc<dyn NetworkMonitor>) -> Self {
        Self {
            client,
            network,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn network(&self) -> &dyn NetworkMonitor {
        self.network.as_ref()
    }

    /// Downloads `source_url` into `destination`.
    ///
    /// A failed attempt is retried once from scratch with resume disabled. Dropping the
    /// progress receiver cancels the transfer without a retry.
    pub async fn download(
        &self,
        source_url: &str,
        destination: &Path,
        policy: BandwidthPolicy,
        allow_resume: bool,
        progress: Option<Sender<DownloadProgressSnapshot>>,
    ) -> Result<PathBuf, TransferError> {
        if !policy.permits(self.network.as_ref()) {
            return Err(TransferError::PolicyBlocked);
        }

        match self.attempt(source_url, destination, allow_resume, progress.as_ref()).await {
            Ok(()) => {}
            Err(TransferError::Cancelled) => return Err(TransferError::Cancelled),
            Err(err) => {
                tracing::warn!(url = source_url, error = %err, "download failed, retrying from scratch");
                self.attempt(source_url, destination, false, progress.as_ref()).await?;
            }
        }
        Ok(destination.to_path_buf())
    }

    async fn attempt(
        &self,
        source_url: &str,
        destination: &Path,
        allow_resume: bool,
        progress: Option<&Sender<DownloadProgressSnapshot>>,
    ) -> Result<(), TransferError> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut existing = if allow_resume {
            match fs::metadata(destination).await {
                Ok(meta) => meta.len(),
                Err(_) => 0,
            }
        } else {
            0
        };

        let mut response = self
            .client
            .get(source_url, (existing > 0).then_some(existing))
            .await?;

        if existing > 0 && response.status == RANGE_NOT_SATISFIABLE {
            tracing::warn!(
                url = source_url,
                existing,
                "range not satisfiable, discarding partial file"
            );
            remove_if_present(destination).await?;
            existing = 0;
            response = self.client.get(source_url, None).await?;
        }

        if !response.is_success() {
            return Err(TransferError::Status {
                url: source_url.to_string(),
                status: response.status,
            });
        }

        let append = existing > 0 && response.status == PARTIAL_CONTENT;
        let resumed_from = if append { existing } else { 0 };
        let total = response.content_length.map(|len| resumed_from + len);

        let mut file = if append {
            OpenOptions::new().append(true).open(destination).await?
        } else {
            fs::File::create(destination).await?
        };

        tracing::debug!(url = source_url, resumed_from, ?total, "download started");
        let mut tracker = ProgressTracker::new(resumed_from, total, self.progress_interval);
        let streamed = copy_body(&mut response, &mut file, &mut tracker, progress).await;
        // whatever arrived stays on disk so a later call can resume from it
        file.flush().await?;
        streamed?;
        file.sync_all().await?;

        // the file is complete; a full or closed receiver no longer matters
        let _ = offer(progress, tracker.snapshot());
        Ok(())
    }
}

async fn copy_body(
    response: &mut HttpResponse,
    file: &mut fs::File,
    tracker: &mut ProgressTracker,
    progress: Option<&Sender<DownloadProgressSnapshot>>,
) -> Result<(), TransferError> {
    while let Some(chunk) = response.body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        tracker.advance(chunk.len());
        if let Some(snapshot) = tracker.due() {
            offer(progress, snapshot)?;
        }
    }
    Ok(())
}

async fn remove_if_present(path: &Path) -> Result<(), TransferError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
