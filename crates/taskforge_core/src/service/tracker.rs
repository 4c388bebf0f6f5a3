//! Tracker use-case service.
//!
//! # Responsibility
//! - Own the ordered task collection for one command invocation.
//! - Provide query/mutation entry points used by the CLI adapter.
//! - Resolve user-supplied id references (full id or prefix).
//!
//! # Invariants
//! - Insertion order is preserved by every operation, including removals.
//! - Failed lookups never mutate state.
//! - No file I/O and no printing; persistence lives in `repo`.

use crate::model::task::{Task, TaskId, TaskRecord, TaskResult, TaskValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors from tracker lookups and mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Title validation failed while creating a task.
    Validation(TaskValidationError),
    /// No task carries the given id.
    NotFound(TaskId),
    /// Reference did not match any task id.
    NoMatch(String),
    /// Reference prefix matched more than one task id.
    Ambiguous { prefix: String, matches: usize },
    /// Positional access past the end of the collection.
    IndexOutOfRange { index: usize, len: usize },
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "no task with id {id}"),
            Self::NoMatch(prefix) => write!(f, "no task matches id prefix `{prefix}`"),
            Self::Ambiguous { prefix, matches } => {
                write!(f, "ambiguous id prefix `{prefix}` (matches {matches})")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "task index {index} out of range for {len} tasks")
            }
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for TrackerError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Whole-collection record mirroring the persisted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerRecord {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

/// In-memory owner of an ordered task collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracker {
    tasks: Vec<Task>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tracker from tasks in iteration order.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
        }
    }

    /// Appends a task at the end of the collection.
    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Creates a pending task from `title`, appends it and returns a copy.
    pub fn add_title(&mut self, title: &str) -> TrackerResult<Task> {
        let task = Task::new(title)?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn get_by_id(&self, id: TaskId) -> TrackerResult<&Task> {
        self.tasks
            .iter()
            .find(|task| task.id() == id)
            .ok_or(TrackerError::NotFound(id))
    }

    pub fn get_at(&self, index: usize) -> TrackerResult<&Task> {
        self.tasks.get(index).ok_or(TrackerError::IndexOutOfRange {
            index,
            len: self.tasks.len(),
        })
    }

    /// Snapshot of every task in insertion order.
    pub fn all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Snapshot of tasks with `done == false`, in insertion order.
    pub fn pending(&self) -> Vec<Task> {
        self.tasks.iter().filter(|task| !task.is_done()).cloned().collect()
    }

    /// Snapshot of tasks with `done == true`, in insertion order.
    pub fn done(&self) -> Vec<Task> {
        self.tasks.iter().filter(|task| task.is_done()).cloned().collect()
    }

    pub fn mark_done_by_id(&mut self, id: TaskId) -> TrackerResult<&Task> {
        let task = self.find_mut(id)?;
        task.mark_done();
        Ok(task)
    }

    pub fn mark_undone_by_id(&mut self, id: TaskId) -> TrackerResult<&Task> {
        let task = self.find_mut(id)?;
        task.mark_undone();
        Ok(task)
    }

    pub fn switch_done_by_id(&mut self, id: TaskId) -> TrackerResult<&Task> {
        let task = self.find_mut(id)?;
        task.switch_done();
        Ok(task)
    }

    pub fn mark_done_at(&mut self, index: usize) -> TrackerResult<&Task> {
        let len = self.tasks.len();
        let task = self
            .tasks
            .get_mut(index)
            .ok_or(TrackerError::IndexOutOfRange { index, len })?;
        task.mark_done();
        Ok(task)
    }

    /// Removes and returns the task with `id`; remaining order is kept.
    pub fn remove_by_id(&mut self, id: TaskId) -> TrackerResult<Task> {
        let position = self
            .tasks
            .iter()
            .position(|task| task.id() == id)
            .ok_or(TrackerError::NotFound(id))?;
        Ok(self.tasks.remove(position))
    }

    pub fn remove_at(&mut self, index: usize) -> TrackerResult<Task> {
        if index >= self.tasks.len() {
            return Err(TrackerError::IndexOutOfRange {
                index,
                len: self.tasks.len(),
            });
        }
        Ok(self.tasks.remove(index))
    }

    /// Removes every done task and returns how many were removed.
    pub fn remove_all_done(&mut self) -> usize {
        self.retain_counting(|task| !task.is_done())
    }

    /// Removes every pending task and returns how many were removed.
    pub fn remove_all_pending(&mut self) -> usize {
        self.retain_counting(Task::is_done)
    }

    /// Removes every task and returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// First id carried by more than one task, in list order.
    ///
    /// `add` does not enforce uniqueness; repositories check this before
    /// persisting.
    pub fn duplicate_id(&self) -> Option<TaskId> {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        self.tasks.iter().map(Task::id).find(|id| !seen.insert(*id))
    }

    /// Resolves a user reference to a task id.
    ///
    /// # Contract
    /// - Surrounding whitespace is ignored.
    /// - A parseable full UUID is returned as-is, without a presence check.
    /// - Otherwise the reference is a case-sensitive prefix of canonical ids:
    ///   exactly one match resolves, zero is `NoMatch`, more is `Ambiguous`.
    pub fn resolve_id(&self, reference: &str) -> TrackerResult<TaskId> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(TrackerError::NoMatch(String::new()));
        }
        if let Ok(id) = Uuid::parse_str(reference) {
            return Ok(id);
        }

        let matches = self
            .tasks
            .iter()
            .map(Task::id)
            .filter(|id| id.to_string().starts_with(reference))
            .collect::<Vec<_>>();

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(TrackerError::NoMatch(reference.to_string())),
            many => Err(TrackerError::Ambiguous {
                prefix: reference.to_string(),
                matches: many.len(),
            }),
        }
    }

    pub fn to_record(&self) -> TrackerRecord {
        TrackerRecord {
            tasks: self.tasks.iter().map(Task::to_record).collect(),
        }
    }

    /// Rebuilds a tracker from its record, keeping list order.
    pub fn from_record(record: TrackerRecord) -> TaskResult<Self> {
        let tasks = record
            .tasks
            .into_iter()
            .map(Task::from_record)
            .collect::<TaskResult<Vec<_>>>()?;
        Ok(Self { tasks })
    }

    fn find_mut(&mut self, id: TaskId) -> TrackerResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id() == id)
            .ok_or(TrackerError::NotFound(id))
    }

    fn retain_counting(&mut self, keep: impl Fn(&Task) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| keep(task));
        before - self.tasks.len()
    }
}
