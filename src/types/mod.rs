pub mod identifiers;

pub use identifiers::{ContentDigest, PageId, PersonalizationLevel};
