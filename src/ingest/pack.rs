use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;

use super::batcher::{Batcher, DEFAULT_BATCH_SIZE};
use super::lines::LineStream;
use super::IngestError;
use crate::integrity;
use crate::manifest::{read_manifest, ManifestError, PackManifest};
use crate::record::{ShardRow, TopicClassifier};
use crate::store::ContentStore;

/// Installs a full pack from a staging directory holding `manifest.json` and its shards.
pub struct PackInstaller {
    store: Arc<dyn ContentStore>,
    classifier: Arc<dyn TopicClassifier>,
    batch_size: usize,
}

impl PackInstaller {
    pub fn new(store: Arc<dyn ContentStore>, classifier: Arc<dyn TopicClassifier>) -> Self {
        Self {
            store,
            classifier,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Verifies and ingests every shard in manifest order.
    ///
    /// Shards are committed one after another; a failing shard leaves the earlier ones installed.
    pub async fn install_from_directory(
        &self,
        directory: &Path,
        expected_pack_id: Option<&str>,
    ) -> Result<PackManifest, IngestError> {
        let manifest = read_manifest(directory).await?;
        if let Some(expected) = expected_pack_id {
            if manifest.pack_id != expected {
                return Err(ManifestError::PackIdMismatch {
                    expected: expected.to_string(),
                    actual: manifest.pack_id.clone(),
                }
                .into());
            }
        }

        for shard in &manifest.shards {
            let shard_file = resolve_shard_path(directory, &shard.url).await;
            if !fs::try_exists(&shard_file).await? {
                return Err(IngestError::MissingShard(shard_file));
            }
            integrity::check(&shard_file, &shard.sha256, &format!("shard {}", shard.id)).await?;
            let rows = self.apply_shard(&shard_file).await?;
            tracing::info!(
                pack_id = %manifest.pack_id,
                shard = %shard.id,
                rows,
                "installed shard"
            );
        }

        Ok(manifest)
    }

    async fn apply_shard(&self, shard_file: &Path) -> Result<usize, IngestError> {
        let mut lines = LineStream::spawn(shard_file)?;
        let mut batcher = Batcher::new(self.store.as_ref(), self.batch_size);
        let mut rows = 0;

        while let Some((line_no, line)) = lines.next().await? {
            let (record, aliases) = ShardRow::decode(line_no, &line)?.into_parts(self.classifier.as_ref());
            batcher.upsert(record, aliases).await?;
            rows += 1;
        }

        batcher.finish().await?;
        Ok(rows)
    }
}

/// Manifest-relative path first, then the bare file name.
async fn resolve_shard_path(directory: &Path, manifest_path: &str) -> PathBuf {
    let candidate = directory.join(manifest_path);
    if fs::try_exists(&candidate).await.unwrap_or(false) {
        return candidate;
    }
    let trimmed = manifest_path.rsplit('/').next().unwrap_or(manifest_path);
    let fallback = directory.join(trimmed);
    if fs::try_exists(&fallback).await.unwrap_or(false) {
        return fallback;
    }
    candidate
}
