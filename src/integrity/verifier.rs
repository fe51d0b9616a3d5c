use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::types::ContentDigest;

const READ_BUFFER: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("Checksum mismatch for {artifact}: expected {expected}, got {actual}")]
    Mismatch {
        artifact: String,
        expected: String,
        actual: String,
    },
    #[error("Unable to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn hash(bytes: &[u8]) -> ContentDigest {
    ContentDigest::from_content(bytes)
}

/// Streams the whole file through SHA-256.
pub fn hash_file(path: &Path) -> Result<ContentDigest, IntegrityError> {
    let unreadable = |source| IntegrityError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(unreadable)?);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_BUFFER];
    loop {
        let read = reader.read(&mut buffer).map_err(unreadable)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(ContentDigest::from_hasher(hasher))
}

/// [`hash_file`] on the blocking pool, so async callers never hash on a worker thread.
pub async fn hash_file_blocking(path: &Path) -> Result<ContentDigest, IntegrityError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || hash_file(&owned))
        .await
        .map_err(|err| IntegrityError::Unreadable {
            path: path.to_path_buf(),
            source: std::io::Error::new(ErrorKind::Other, format!("hashing task join error: {err}")),
        })?
}

/// Returns whether `path` hashes to `expected_hex`.
///
/// An unreadable file counts as a mismatch; the caller decides whether that is fatal.
pub async fn verify(path: &Path, expected_hex: &str) -> bool {
    match hash_file_blocking(path).await {
        Ok(digest) => digest.matches(expected_hex),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "integrity check could not read file");
            false
        }
    }
}

/// Like [`verify`] but reports the mismatch as an error naming `artifact`.
pub async fn check(path: &Path, expected_hex: &str, artifact: &str) -> Result<(), IntegrityError> {
    let digest = hash_file_blocking(path).await?;
    if digest.matches(expected_hex) {
        Ok(())
    } else {
        Err(IntegrityError::Mismatch {
            artifact: artifact.to_string(),
            expected: expected_hex.to_string(),
            actual: digest.as_str().to_string(),
        })
    }
}
