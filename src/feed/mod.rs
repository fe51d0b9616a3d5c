pub mod service;

pub use service::{FeedService, FEED_CANDIDATE_POOL};
