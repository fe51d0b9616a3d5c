use serde::{Deserialize, Serialize};

use crate::transfer::DownloadProgressSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    NoManifest,
    SkippedNetwork,
    UpToDate,
    Updated,
    Failed,
}

/// Terminal value of one `check_and_apply` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub status: SyncStatus,
    pub installed_version: u64,
    /// Signature of the manifest now installed, when this attempt installed one.
    pub installed_signature: Option<String>,
    pub message: String,
}

impl SyncResult {
    pub(crate) fn unchanged(status: SyncStatus, installed_version: u64, message: impl Into<String>) -> Self {
        Self {
            status,
            installed_version,
            installed_signature: None,
            message: message.into(),
        }
    }

    /// Scheduled syncs retry only failed attempts.
    pub fn should_retry(&self) -> bool {
        self.status == SyncStatus::Failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    FetchingManifest,
    DownloadingDelta,
    DownloadingShards,
    Installing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncProgress {
    pub phase: SyncPhase,
    pub percent: f32,
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
    pub bytes_per_second: u64,
    pub detail: String,
}

impl SyncProgress {
    pub(crate) fn phase(phase: SyncPhase, percent: f32, total_bytes: u64, detail: impl Into<String>) -> Self {
        Self {
            phase,
            percent,
            downloaded_bytes: (total_bytes as f64 * f64::from(percent) / 100.0) as u64,
            total_bytes,
            bytes_per_second: 0,
            detail: detail.into(),
        }
    }

    /// Progress of a single file, unknown totals reported as zero percent.
    pub(crate) fn single_file(phase: SyncPhase, snapshot: DownloadProgressSnapshot, detail: &str) -> Self {
        let total = snapshot.total_bytes.unwrap_or(0);
        let percent = if total > 0 {
            ((snapshot.downloaded_bytes as f64 / total as f64) * 100.0).clamp(0.0, 100.0) as f32
        } else {
            0.0
        };
        Self {
            phase,
            percent,
            downloaded_bytes: snapshot.downloaded_bytes,
            total_bytes: total,
            bytes_per_second: snapshot.bytes_per_second,
            detail: detail.to_string(),
        }
    }

    /// Progress across all shards of a pack.
    pub(crate) fn pack(
        snapshot: DownloadProgressSnapshot,
        completed_bytes: u64,
        pack_bytes: u64,
        shard_id: &str,
    ) -> Self {
        let total = pack_bytes.max(1);
        let downloaded = (completed_bytes + snapshot.downloaded_bytes).min(total);
        Self {
            phase: SyncPhase::DownloadingShards,
            percent: ((downloaded as f64 / total as f64) * 100.0) as f32,
            downloaded_bytes: downloaded,
            total_bytes: total,
            bytes_per_second: snapshot.bytes_per_second,
            detail: shard_id.to_string(),
        }
    }
}
