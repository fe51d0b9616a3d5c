pub mod batch;
pub mod contract;
pub mod memory;

pub use batch::IngestBatch;
pub use contract::{ContentStore, HistoryEntry, StorageError};
pub use memory::MemoryStore;
