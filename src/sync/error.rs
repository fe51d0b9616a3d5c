use thiserror::Error;

use crate::ingest::IngestError;
use crate::integrity::IntegrityError;
use crate::manifest::ManifestError;
use crate::record::DecodeError;
use crate::store::StorageError;
use crate::transfer::TransferError;

/// Everything that can fail one update attempt.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Network(TransferError),
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("{0} decoding is not implemented")]
    UnimplementedCodec(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Update cancelled")]
    Cancelled,
}

impl From<TransferError> for SyncError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Cancelled => SyncError::Cancelled,
            other => SyncError::Network(other),
        }
    }
}

impl From<IngestError> for SyncError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Io(e) => SyncError::Io(e),
            IngestError::Decode(e) => SyncError::Decode(e),
            IngestError::Storage(e) => SyncError::Storage(e),
            IngestError::Manifest(e) => SyncError::Manifest(e),
            IngestError::Integrity(e) => SyncError::Integrity(e),
            IngestError::UnimplementedCodec(codec) => SyncError::UnimplementedCodec(codec),
            IngestError::MissingShard(path) => SyncError::Manifest(ManifestError::Missing(path.display().to_string())),
        }
    }
}
