pub mod config;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod staging;

pub use config::SyncConfig;
pub use error::SyncError;
pub use orchestrator::SyncOrchestrator;
pub use outcome::{SyncPhase, SyncProgress, SyncResult, SyncStatus};
