//! In-memory tracker repository for tests and dry runs.

use crate::repo::tracker_repo::{ensure_unique_ids, RepoResult, TrackerRepository};
use crate::service::tracker::{Tracker, TrackerRecord};
use std::cell::{Cell, RefCell};

/// Keeps the last saved tracker record in process memory.
#[derive(Debug, Default)]
pub struct InMemoryTrackerRepository {
    record: RefCell<Option<TrackerRecord>>,
    saves: Cell<usize>,
}

impl InMemoryTrackerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `tracker` already stored.
    pub fn seeded(tracker: &Tracker) -> Self {
        Self {
            record: RefCell::new(Some(tracker.to_record())),
            saves: Cell::new(0),
        }
    }

    /// Number of `save()` calls since construction.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl TrackerRepository for InMemoryTrackerRepository {
    fn load(&self) -> RepoResult<Tracker> {
        match self.record.borrow().clone() {
            Some(record) => Ok(Tracker::from_record(record)?),
            None => Ok(Tracker::new()),
        }
    }

    fn save(&self, tracker: &Tracker) -> RepoResult<()> {
        ensure_unique_ids(tracker)?;
        *self.record.borrow_mut() = Some(tracker.to_record());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
