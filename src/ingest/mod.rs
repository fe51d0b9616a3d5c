pub mod batcher;
pub mod delta;
pub mod lines;
pub mod pack;

pub use batcher::DEFAULT_BATCH_SIZE;
pub use delta::DeltaApplier;
pub use lines::{open_lines, LineStream};
pub use pack::PackInstaller;

use std::path::PathBuf;

use thiserror::Error;

use crate::integrity::IntegrityError;
use crate::manifest::ManifestError;
use crate::record::DecodeError;
use crate::store::StorageError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error("{0} decoding is not implemented")]
    UnimplementedCodec(String),
    #[error("Missing shard file: {0}")]
    MissingShard(PathBuf),
}
