//! Tracker repository contract and shared error type.

use crate::model::task::{TaskId, TaskValidationError};
use crate::service::tracker::Tracker;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for tracker persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Backing file could not be read or written.
    Io { path: PathBuf, source: io::Error },
    /// Backing document is not a valid tracker document.
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A stored task record violates task invariants.
    Validation(TaskValidationError),
    /// Two tasks in one tracker share an id.
    DuplicateId(TaskId),
    Sqlite(rusqlite::Error),
    /// Task database was written by a newer schema than this build knows.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Stored row cannot be converted into a task.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Format { path, source } => {
                write!(f, "malformed task document `{}`: {source}", path.display())
            }
            Self::Validation(err) => write!(f, "invalid stored task: {err}"),
            Self::DuplicateId(id) => write!(f, "duplicate task id {id}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "task database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Format { source, .. } => Some(source),
            Self::Validation(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::DuplicateId(_) | Self::UnsupportedSchemaVersion { .. } | Self::InvalidData(_) => {
                None
            }
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Rejects trackers that would persist the same id twice.
/// Every backend calls this before writing.
pub fn ensure_unique_ids(tracker: &Tracker) -> RepoResult<()> {
    match tracker.duplicate_id() {
        Some(id) => Err(RepoError::DuplicateId(id)),
        None => Ok(()),
    }
}

/// Persistence capability for a whole tracker.
///
/// Implementations load the full state once and replace it wholesale on save.
pub trait TrackerRepository {
    /// Loads the stored tracker, or an empty one when nothing was stored yet.
    fn load(&self) -> RepoResult<Tracker>;

    /// Replaces the stored state with `tracker`.
    ///
    /// Fails with `RepoError::DuplicateId` before touching storage when two
    /// tasks share an id.
    fn save(&self, tracker: &Tracker) -> RepoResult<()>;
}

impl<R: TrackerRepository + ?Sized> TrackerRepository for Box<R> {
    fn load(&self) -> RepoResult<Tracker> {
        (**self).load()
    }

    fn save(&self, tracker: &Tracker) -> RepoResult<()> {
        (**self).save(tracker)
    }
}
