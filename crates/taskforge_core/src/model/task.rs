//! Task domain model.
//!
//! # Responsibility
//! - Define the single to-do item tracked by the system.
//! - Own title validation and done-state transitions.
//! - Convert between the domain type and its persisted record shape.
//!
//! # Invariants
//! - `id` is stable, never nil, and never reassigned after construction.
//! - `title` is trimmed and never empty or whitespace-only.
//! - Equality and hashing consider `id` only, so mutating `title`/`done`
//!   never changes how a task compares or hashes.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Number of leading id characters shown in display lines.
pub const SHORT_ID_LEN: usize = 8;

const STATUS_DONE: &str = "Done";
const STATUS_UNDONE: &str = "Undone";

pub type TaskResult<T> = Result<T, TaskValidationError>;

/// Validation failures raised while building or mutating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trimming surrounding whitespace.
    EmptyTitle,
    /// Persisted record carries no `title` field.
    MissingTitle,
    /// The nil UUID cannot identify a task.
    NilId,
    /// Persisted `id` is not a parseable UUID.
    InvalidId(String),
    /// Legacy `<Status>|<title>` text has no separator.
    MalformedText(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::MissingTitle => write!(f, "task record is missing `title`"),
            Self::NilId => write!(f, "task id must not be the nil uuid"),
            Self::InvalidId(value) => write!(f, "task id is not a valid uuid: `{value}`"),
            Self::MalformedText(value) => {
                write!(f, "expected `<Status>|<title>` task text, got `{value}`")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Plain record form of a task, as stored in the JSON document.
///
/// Field order is the persisted key order. On read, a missing or null `id`
/// means "generate a fresh one" and a missing `done` means `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub done: bool,
}

/// A single trackable to-do item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    id: TaskId,
    title: String,
    done: bool,
}

impl Task {
    /// Creates a pending task with a generated id.
    pub fn new(title: &str) -> TaskResult<Self> {
        Self::create(title, false, None)
    }

    /// Creates a task from explicit parts.
    ///
    /// # Invariants
    /// - `title` is trimmed and must not be empty.
    /// - A missing `id` is replaced by a fresh v4 UUID; a nil `id` is rejected.
    pub fn create(title: &str, done: bool, id: Option<TaskId>) -> TaskResult<Self> {
        let id = match id {
            Some(id) if id.is_nil() => return Err(TaskValidationError::NilId),
            Some(id) => id,
            None => Uuid::new_v4(),
        };

        Ok(Self {
            id,
            title: normalize_title(title)?,
            done,
        })
    }

    /// Parses the legacy `Done|Buy milk` text form.
    ///
    /// Any status other than `Done` yields a pending task.
    pub fn from_text(text: &str) -> TaskResult<Self> {
        let (status, title) = text
            .split_once('|')
            .ok_or_else(|| TaskValidationError::MalformedText(text.to_string()))?;
        Self::create(title, status.trim() == STATUS_DONE, None)
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Replaces the title after trimming; the old title is kept on error.
    pub fn set_title(&mut self, title: &str) -> TaskResult<()> {
        self.title = normalize_title(title)?;
        Ok(())
    }

    pub fn mark_done(&mut self) {
        self.done = true;
    }

    pub fn mark_undone(&mut self) {
        self.done = false;
    }

    /// Toggles the done flag regardless of its current value.
    pub fn switch_done(&mut self) {
        self.done = !self.done;
    }

    /// Abbreviated id used in human-readable output.
    pub fn short_id(&self) -> String {
        let mut short = self.id.to_string();
        short.truncate(SHORT_ID_LEN);
        short
    }

    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: Some(self.id.to_string()),
            title: Some(self.title.clone()),
            done: self.done,
        }
    }

    pub fn from_record(record: TaskRecord) -> TaskResult<Self> {
        let title = record.title.ok_or(TaskValidationError::MissingTitle)?;
        let id = match record.id {
            Some(raw) => {
                Some(Uuid::parse_str(&raw).map_err(|_| TaskValidationError::InvalidId(raw))?)
            }
            None => None,
        };
        Self::create(&title, record.done, id)
    }

    /// Stable one-line rendering: `[<Status>] (<short-id>) <title>`.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let status = if self.done { STATUS_DONE } else { STATUS_UNDONE };
        write!(f, "[{status}] ({}) {}", self.short_id(), self.title)
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(value: TaskRecord) -> Result<Self, Self::Error> {
        Self::from_record(value)
    }
}

impl From<Task> for TaskRecord {
    fn from(value: Task) -> Self {
        value.to_record()
    }
}

fn normalize_title(value: &str) -> TaskResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}
