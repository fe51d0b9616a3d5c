use std::time::{Duration, Instant};

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

use super::TransferError;

/// About five updates per second.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgressSnapshot {
    pub downloaded_bytes: u64,
    /// `None` when the server did not report a length.
    pub total_bytes: Option<u64>,
    pub bytes_per_second: u64,
}

pub(crate) struct ProgressTracker {
    downloaded: u64,
    resumed_from: u64,
    total: Option<u64>,
    started: Instant,
    last_emit: Option<Instant>,
    interval: Duration,
}

impl ProgressTracker {
    pub(crate) fn new(resumed_from: u64, total: Option<u64>, interval: Duration) -> Self {
        Self {
            downloaded: resumed_from,
            resumed_from,
            total,
            started: Instant::now(),
            last_emit: None,
            interval,
        }
    }

    pub(crate) fn advance(&mut self, bytes: usize) {
        self.downloaded += bytes as u64;
    }

    pub(crate) fn snapshot(&self) -> DownloadProgressSnapshot {
        let elapsed = self.started.elapsed().as_secs_f64();
        let transferred = self.downloaded - self.resumed_from;
        let bytes_per_second = if elapsed > 0.0 {
            (transferred as f64 / elapsed) as u64
        } else {
            0
        };
        DownloadProgressSnapshot {
            downloaded_bytes: self.downloaded,
            total_bytes: self.total,
            bytes_per_second,
        }
    }

    /// A snapshot if the throttle interval has elapsed since the last one.
    pub(crate) fn due(&mut self) -> Option<DownloadProgressSnapshot> {
        let now = Instant::now();
        match self.last_emit {
            Some(last) if now.duration_since(last) < self.interval => None,
            _ => {
                self.last_emit = Some(now);
                Some(self.snapshot())
            }
        }
    }
}

/// Non-blocking publish; a full channel drops the update, a closed one cancels.
pub(crate) fn offer<T>(sink: Option<&Sender<T>>, value: T) -> Result<(), TransferError> {
    let Some(sink) = sink else {
        return Ok(());
    };
    match sink.try_send(value) {
        Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
        Err(TrySendError::Closed(_)) => Err(TransferError::Cancelled),
    }
}
