//! Core domain logic for Taskforge.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{open_repository, StorageBackend, StoreConfig, DEFAULT_DATA_PATH};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskId, TaskRecord, TaskResult, TaskValidationError};
pub use repo::json_repo::JsonTrackerRepository;
pub use repo::memory_repo::InMemoryTrackerRepository;
pub use repo::sqlite_repo::{SqliteTrackerRepository, SCHEMA_VERSION};
pub use repo::tracker_repo::{ensure_unique_ids, RepoError, RepoResult, TrackerRepository};
pub use service::tracker::{Tracker, TrackerError, TrackerRecord, TrackerResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
