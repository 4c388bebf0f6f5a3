//! JSON file tracker repository.
//!
//! # Responsibility
//! - Read and write the `{"tasks": [...]}` document at one configured path.
//!
//! # Invariants
//! - A missing file loads as an empty tracker; other I/O failures propagate.
//! - Malformed documents surface as `RepoError::Format`, never as empty state.
//! - Documents with repeated task ids are neither written nor loaded.
//! - The document is fully serialized before the file is opened for writing.

use crate::repo::tracker_repo::{ensure_unique_ids, RepoError, RepoResult, TrackerRepository};
use crate::service::tracker::{Tracker, TrackerRecord};
use log::{error, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Tracker repository backed by a pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonTrackerRepository {
    path: PathBuf,
}

impl JsonTrackerRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> RepoResult<Option<TrackerRecord>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(RepoError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| RepoError::Format {
                path: self.path.clone(),
                source,
            })
    }

    fn write_document(&self, record: &TrackerRecord) -> RepoResult<()> {
        let mut text = serde_json::to_string_pretty(record).map_err(|source| RepoError::Format {
            path: self.path.clone(),
            source,
        })?;
        text.push('\n');

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| RepoError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&self.path, text).map_err(|source| RepoError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl TrackerRepository for JsonTrackerRepository {
    fn load(&self) -> RepoResult<Tracker> {
        let started_at = Instant::now();
        let result = self
            .read_document()
            .and_then(|record| match record {
                Some(record) => Tracker::from_record(record).map_err(RepoError::from),
                None => Ok(Tracker::new()),
            })
            .and_then(|tracker| ensure_unique_ids(&tracker).map(|()| tracker));

        match &result {
            Ok(tracker) => info!(
                "event=repo_load module=repo backend=json status=ok tasks={} duration_ms={}",
                tracker.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=repo_load module=repo backend=json status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn save(&self, tracker: &Tracker) -> RepoResult<()> {
        let started_at = Instant::now();
        let result =
            ensure_unique_ids(tracker).and_then(|()| self.write_document(&tracker.to_record()));

        match &result {
            Ok(()) => info!(
                "event=repo_save module=repo backend=json status=ok tasks={} duration_ms={}",
                tracker.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=repo_save module=repo backend=json status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}
