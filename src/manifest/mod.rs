pub mod codec;
pub mod local;
pub mod pack;

pub use codec::{Compression, FileCodec};
pub use local::{read_manifest, write_manifest, MANIFEST_FILE};
pub use pack::{ManifestError, PackAttribution, PackDelta, PackManifest, PackShard};
