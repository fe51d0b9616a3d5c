use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ingest::DEFAULT_BATCH_SIZE;
use crate::transfer::{HttpConfig, DEFAULT_PROGRESS_INTERVAL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Root under which `<packId>/v<version>` staging directories are created.
    pub staging_root: PathBuf,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    /// Remove the staging directory after a successful update.
    #[serde(default)]
    pub prune_staging: bool,
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_progress_interval_ms() -> u64 {
    DEFAULT_PROGRESS_INTERVAL.as_millis() as u64
}

impl SyncConfig {
    pub fn new(staging_root: impl Into<PathBuf>) -> Self {
        Self {
            staging_root: staging_root.into(),
            batch_size: default_batch_size(),
            progress_interval_ms: default_progress_interval_ms(),
            prune_staging: false,
            http: HttpConfig::default(),
        }
    }

    /// Defaults overridden by `PACKSYNC_*` environment variables.
    pub fn from_env() -> Self {
        let staging_root = std::env::var("PACKSYNC_STAGING_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("packsync"));
        let mut config = Self::new(staging_root);
        if let Some(size) = std::env::var("PACKSYNC_BATCH_SIZE").ok().and_then(|s| s.parse().ok()) {
            config.batch_size = size;
        }
        if let Ok(prune) = std::env::var("PACKSYNC_PRUNE_STAGING") {
            config.prune_staging = matches!(prune.trim(), "1" | "true" | "yes");
        }
        config
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }
}
