use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::pack::{ManifestError, PackManifest};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Reads `manifest.json` from `directory` on the blocking pool.
pub async fn read_manifest(directory: &Path) -> Result<PackManifest, ManifestError> {
    let path = directory.join(MANIFEST_FILE);
    run_blocking(move || read_manifest_file(&path)).await
}

/// Writes `manifest.json` through a temp file and rename so readers never see a torn file.
pub async fn write_manifest(directory: &Path, manifest: &PackManifest) -> Result<(), ManifestError> {
    let directory = directory.to_path_buf();
    let manifest = manifest.clone();
    run_blocking(move || write_manifest_file(&directory, &manifest)).await
}

fn read_manifest_file(path: &Path) -> Result<PackManifest, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::Missing(path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    PackManifest::from_slice(&bytes)
}

fn write_manifest_file(directory: &Path, manifest: &PackManifest) -> Result<(), ManifestError> {
    fs::create_dir_all(directory)?;
    let temp_path = directory.join(format!("{MANIFEST_FILE}.tmp"));
    let f = fs::File::create(&temp_path)?;
    serde_json::to_writer_pretty(&f, manifest)?;
    f.sync_all()?;
    fs::rename(&temp_path, directory.join(MANIFEST_FILE))?;
    Ok(())
}

async fn run_blocking<T, F>(work: F) -> Result<T, ManifestError>
where
    F: FnOnce() -> Result<T, ManifestError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|err| {
        ManifestError::Io(std::io::Error::new(
            ErrorKind::Other,
            format!("manifest task join error: {err}"),
        ))
    })?
}
