use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Pack-level compression declared by the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    /// `None` for anything outside the supported set.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Compression::None),
            "gzip" => Some(Compression::Gzip),
            _ => None,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => f.write_str("none"),
            Compression::Gzip => f.write_str("gzip"),
        }
    }
}

/// Codec of a single staged file, chosen by its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCodec {
    Plain,
    Gzip,
    Unsupported(String),
}

impl FileCodec {
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("gz") => FileCodec::Gzip,
            Some(other @ ("zst" | "zstd" | "br" | "xz")) => FileCodec::Unsupported(other.to_string()),
            _ => FileCodec::Plain,
        }
    }
}
