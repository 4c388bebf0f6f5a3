//! Storage configuration and repository selection.
//!
//! # Responsibility
//! - Carry the data file location and backend choice as explicit values.
//! - Build the matching `TrackerRepository` for one invocation.
//!
//! # Invariants
//! - No module-level data path; callers always pass a `StoreConfig`.

use crate::repo::json_repo::JsonTrackerRepository;
use crate::repo::sqlite_repo::SqliteTrackerRepository;
use crate::repo::tracker_repo::{RepoError, RepoResult, TrackerRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// Data path used when the caller does not provide one.
pub const DEFAULT_DATA_PATH: &str = "data/tasks.json";

/// Config string value for the JSON file backend.
pub const STORAGE_BACKEND_JSON: &str = "json";
/// Config string value for the SQLite backend.
pub const STORAGE_BACKEND_SQLITE: &str = "sqlite";

/// Persistence backend selected for a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => STORAGE_BACKEND_JSON,
            Self::Sqlite => STORAGE_BACKEND_SQLITE,
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend name parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedBackendError(pub String);

impl Display for UnsupportedBackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported storage backend `{}`; expected {STORAGE_BACKEND_JSON}|{STORAGE_BACKEND_SQLITE}",
            self.0
        )
    }
}

impl Error for UnsupportedBackendError {}

impl FromStr for StorageBackend {
    type Err = UnsupportedBackendError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            STORAGE_BACKEND_JSON => Ok(Self::Json),
            STORAGE_BACKEND_SQLITE => Ok(Self::Sqlite),
            other => Err(UnsupportedBackendError(other.to_string())),
        }
    }
}

/// Where and how tracker state is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_path: PathBuf,
    pub backend: StorageBackend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            backend: StorageBackend::default(),
        }
    }
}

impl StoreConfig {
    pub fn new(data_path: impl Into<PathBuf>, backend: StorageBackend) -> Self {
        Self {
            data_path: data_path.into(),
            backend,
        }
    }
}

/// Builds the repository described by `config`.
///
/// The SQLite backend creates the parent directory before opening, since
/// SQLite cannot create it; the JSON backend does so lazily on save.
pub fn open_repository(config: &StoreConfig) -> RepoResult<Box<dyn TrackerRepository>> {
    match config.backend {
        StorageBackend::Json => Ok(Box::new(JsonTrackerRepository::new(
            config.data_path.clone(),
        ))),
        StorageBackend::Sqlite => {
            if let Some(parent) = config
                .data_path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
            {
                fs::create_dir_all(parent).map_err(|source| RepoError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            Ok(Box::new(SqliteTrackerRepository::open(&config.data_path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StorageBackend, StoreConfig, UnsupportedBackendError, DEFAULT_DATA_PATH};
    use std::path::Path;

    #[test]
    fn parses_backend_names_case_insensitively() {
        assert_eq!(" JSON ".parse::<StorageBackend>(), Ok(StorageBackend::Json));
        assert_eq!("sqlite".parse::<StorageBackend>(), Ok(StorageBackend::Sqlite));
        assert_eq!(
            "yaml".parse::<StorageBackend>(),
            Err(UnsupportedBackendError("yaml".to_string()))
        );
    }

    #[test]
    fn default_config_points_at_json_document() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, StorageBackend::Json);
        assert_eq!(config.data_path, Path::new(DEFAULT_DATA_PATH));
    }
}
