use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::mpsc::{self, error::TrySendError, Sender};

use super::config::SyncConfig;
use super::error::SyncError;
use super::outcome::{SyncPhase, SyncProgress, SyncResult, SyncStatus};
use super::staging::{local_file_name, resolve_url, shard_file_name, staging_dir};
use crate::ingest::{DeltaApplier, PackInstaller};
use crate::integrity;
use crate::manifest::{write_manifest, PackManifest, PackShard};
use crate::record::TopicClassifier;
use crate::store::ContentStore;
use crate::transfer::{
    BandwidthPolicy, ChunkedDownloader, DownloadProgressSnapshot, HttpClient, NetworkMonitor, ReqwestClient,
    TransferError,
};

const PROGRESS_BUFFER: usize = 16;
/// Upper bound on a manifest document.
pub const MAX_MANIFEST_BYTES: usize = 8 * 1024 * 1024;

enum Outcome {
    UpToDate,
    Updated(PackManifest),
}

/// Owns one pack's update lifecycle: manifest, version gate, delta or full install.
///
/// Every collaborator is injected; the orchestrator holds no global state.
pub struct SyncOrchestrator {
    client: Arc<dyn HttpClient>,
    network: Arc<dyn NetworkMonitor>,
    downloader: ChunkedDownloader,
    delta_applier: DeltaApplier,
    installer: PackInstaller,
    config: SyncConfig,
}

impl SyncOrchestrator {
    pub fn new(
        config: SyncConfig,
        store: Arc<dyn ContentStore>,
        client: Arc<dyn HttpClient>,
        network: Arc<dyn NetworkMonitor>,
        classifier: Arc<dyn TopicClassifier>,
    ) -> Self {
        let downloader = ChunkedDownloader::new(client.clone(), network.clone())
            .with_progress_interval(config.progress_interval());
        let delta_applier =
            DeltaApplier::new(store.clone(), classifier.clone()).with_batch_size(config.batch_size);
        let installer = PackInstaller::new(store, classifier).with_batch_size(config.batch_size);
        Self {
            client,
            network,
            downloader,
            delta_applier,
            installer,
            config,
        }
    }

    /// Production wiring: a `reqwest` client built from `config.http`.
    pub fn with_reqwest(
        config: SyncConfig,
        store: Arc<dyn ContentStore>,
        network: Arc<dyn NetworkMonitor>,
        classifier: Arc<dyn TopicClassifier>,
    ) -> Result<Self, TransferError> {
        let client = Arc::new(ReqwestClient::new(&config.http)?);
        Ok(Self::new(config, store, client, network, classifier))
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Runs one synchronization attempt. Never returns an error: failures become
    /// [`SyncStatus::Failed`] with `installed_version` unchanged.
    ///
    /// Closing the `progress` receiver cancels the attempt at the next step; a
    /// partially downloaded file stays on disk for a later resume.
    pub async fn check_and_apply(
        &self,
        manifest_url: &str,
        policy: BandwidthPolicy,
        installed_version: u64,
        progress: Option<Sender<SyncProgress>>,
    ) -> SyncResult {
        if manifest_url.trim().is_empty() {
            return SyncResult::unchanged(SyncStatus::NoManifest, installed_version, "Manifest URL is empty");
        }
        if !policy.permits(self.network.as_ref()) {
            return SyncResult::unchanged(
                SyncStatus::SkippedNetwork,
                installed_version,
                "Unmetered-only mode is enabled and the device is on a metered network",
            );
        }

        match self
            .run(manifest_url, policy, installed_version, progress.as_ref())
            .await
        {
            Ok(Outcome::UpToDate) => {
                SyncResult::unchanged(SyncStatus::UpToDate, installed_version, "No new pack available")
            }
            Ok(Outcome::Updated(manifest)) => SyncResult {
                status: SyncStatus::Updated,
                installed_version: manifest.version,
                installed_signature: Some(manifest.signature()),
                message: format!("Updated to pack version {}", manifest.version),
            },
            Err(err) => {
                tracing::error!(manifest_url, error = %err, "pack update failed");
                SyncResult::unchanged(SyncStatus::Failed, installed_version, err.to_string())
            }
        }
    }

    async fn run(
        &self,
        manifest_url: &str,
        policy: BandwidthPolicy,
        installed_version: u64,
        progress: Option<&Sender<SyncProgress>>,
    ) -> Result<Outcome, SyncError> {
        emit(
            progress,
            SyncProgress::phase(SyncPhase::FetchingManifest, 0.0, 0, manifest_url),
        )?;
        let manifest = self.fetch_manifest(manifest_url).await?;
        tracing::info!(
            pack_id = %manifest.pack_id,
            version = manifest.version,
            installed_version,
            "fetched manifest"
        );

        if manifest.version <= installed_version {
            return Ok(Outcome::UpToDate);
        }
        manifest.codec()?;

        let staging = staging_dir(self.config.staging_root(), &manifest.pack_id, manifest.version);
        fs::create_dir_all(&staging).await?;

        let delta_applied = self
            .try_apply_delta(manifest_url, &manifest, &staging, policy, installed_version, progress)
            .await?;
        if !delta_applied {
            self.apply_full_pack(manifest_url, &manifest, &staging, policy, progress)
                .await?;
        }

        // already installed; a receiver that went away no longer matters
        let _ = emit(
            progress,
            SyncProgress::phase(
                SyncPhase::Completed,
                100.0,
                manifest.total_bytes(),
                format!("Installed pack v{}", manifest.version),
            ),
        );

        if self.config.prune_staging {
            if let Err(err) = fs::remove_dir_all(&staging).await {
                tracing::warn!(path = %staging.display(), error = %err, "could not prune staging directory");
            }
        }
        Ok(Outcome::Updated(manifest))
    }

    async fn fetch_manifest(&self, manifest_url: &str) -> Result<PackManifest, SyncError> {
        let response = self.client.get(manifest_url, None).await?;
        if !response.is_success() {
            return Err(TransferError::Status {
                url: manifest_url.to_string(),
                status: response.status,
            }
            .into());
        }
        let payload = response.into_bytes(MAX_MANIFEST_BYTES).await?;
        Ok(PackManifest::from_slice(&payload)?)
    }

    /// Returns `false` when the full pack must be installed instead.
    async fn try_apply_delta(
        &self,
        manifest_url: &str,
        manifest: &PackManifest,
        staging: &Path,
        policy: BandwidthPolicy,
        installed_version: u64,
        progress: Option<&Sender<SyncProgress>>,
    ) -> Result<bool, SyncError> {
        let Some(delta) = &manifest.delta else {
            return Ok(false);
        };
        if !delta.applies_to(installed_version) {
            tracing::debug!(
                base_version = delta.base_version,
                installed_version,
                "delta does not apply to installed version"
            );
            return Ok(false);
        }

        let local_name = local_file_name(&delta.url, "delta.ndjson");
        let local_delta = staging.join(&local_name);
        self.fetch(
            &resolve_url(manifest_url, &delta.url),
            &local_delta,
            policy,
            progress,
            |snapshot| SyncProgress::single_file(SyncPhase::DownloadingDelta, snapshot, &local_name),
        )
        .await?;

        if !integrity::verify(&local_delta, &delta.sha256).await {
            tracing::warn!(file = %local_name, "delta checksum mismatch, falling back to full pack");
            if let Err(err) = fs::remove_file(&local_delta).await {
                tracing::warn!(file = %local_name, error = %err, "could not remove rejected delta");
            }
            return Ok(false);
        }

        let ops = self.delta_applier.apply(&local_delta).await?;
        tracing::info!(
            pack_id = %manifest.pack_id,
            from = delta.base_version,
            to = delta.target_version,
            ops,
            "delta applied"
        );
        Ok(true)
    }

    async fn apply_full_pack(
        &self,
        manifest_url: &str,
        manifest: &PackManifest,
        staging: &Path,
        policy: BandwidthPolicy,
        progress: Option<&Sender<SyncProgress>>,
    ) -> Result<(), SyncError> {
        let pack_bytes = manifest.total_bytes().max(1);
        let mut completed_bytes = 0u64;
        let mut local_shards = Vec::with_capacity(manifest.shards.len());
        let mut taken_names = BTreeSet::new();

        for shard in &manifest.shards {
            let local_name = shard_file_name(&shard.url, &shard.id, &mut taken_names);
            let local_file = staging.join(&local_name);
            let completed = completed_bytes;
            self.fetch(
                &resolve_url(manifest_url, &shard.url),
                &local_file,
                policy,
                progress,
                |snapshot| SyncProgress::pack(snapshot, completed, pack_bytes, &shard.id),
            )
            .await?;

            integrity::check(&local_file, &shard.sha256, &format!("shard {}", shard.id)).await?;
            let bytes = fs::metadata(&local_file).await?.len();
            completed_bytes += bytes.min(shard.bytes);

            local_shards.push(PackShard {
                url: local_name,
                bytes,
                ..shard.clone()
            });
        }

        emit(
            progress,
            SyncProgress::phase(SyncPhase::Installing, 100.0, pack_bytes, "Applying downloaded content"),
        )?;
        let local_manifest = PackManifest {
            shards: local_shards,
            ..manifest.clone()
        };
        write_manifest(staging, &local_manifest).await?;
        self.installer
            .install_from_directory(staging, Some(&manifest.pack_id))
            .await?;
        tracing::info!(pack_id = %manifest.pack_id, version = manifest.version, "full pack installed");
        Ok(())
    }

    /// Downloads one file, translating its progress snapshots with `translate`.
    async fn fetch<F>(
        &self,
        url: &str,
        destination: &Path,
        policy: BandwidthPolicy,
        progress: Option<&Sender<SyncProgress>>,
        translate: F,
    ) -> Result<(), SyncError>
    where
        F: Fn(DownloadProgressSnapshot) -> SyncProgress,
    {
        let Some(outer) = progress else {
            self.downloader
                .download(url, destination, policy, true, None)
                .await?;
            return Ok(());
        };

        let (tx, mut rx) = mpsc::channel(PROGRESS_BUFFER);
        let download = self.downloader.download(url, destination, policy, true, Some(tx));
        let forward = async move {
            while let Some(snapshot) = rx.recv().await {
                match outer.try_send(translate(snapshot)) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    // dropping `rx` makes the downloader observe the cancellation
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        };
        let (result, ()) = tokio::join!(download, forward);
        result?;
        Ok(())
    }
}

fn emit(progress: Option<&Sender<SyncProgress>>, update: SyncProgress) -> Result<(), SyncError> {
    match progress.map(|sink| sink.try_send(update)) {
        None | Some(Ok(())) | Some(Err(TrySendError::Full(_))) => Ok(()),
        Some(Err(TrySendError::Closed(_))) => Err(SyncError::Cancelled),
    }
}
