pub mod content;
pub mod normalize;
pub mod topic;
pub mod wire;

pub use content::{AliasRecord, ContentRecord};
pub use normalize::{normalize_search, normalize_topic_key};
pub use topic::{KeyTopicClassifier, TopicClassifier};
pub use wire::{parse_flexible_bool, DecodeError, DeltaOp, DeltaRow, ShardArticle, ShardRow};
