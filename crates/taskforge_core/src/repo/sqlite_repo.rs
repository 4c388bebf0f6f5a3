//! SQLite tracker repository.
//!
//! # Responsibility
//! - Persist tracker state as one `tasks` row per task.
//! - Create and upgrade the `tasks` table on open.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`; a database stamped
//!   newer than `SCHEMA_VERSION` is refused, never downgraded.
//! - Row `position` mirrors tracker order; loads sort by it.
//! - `save()` replaces all rows inside one transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::task::Task;
use crate::repo::tracker_repo::{ensure_unique_ids, RepoError, RepoResult, TrackerRepository};
use crate::service::tracker::Tracker;
use log::{error, info};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Upgrade steps for the task table; step `n` moves `user_version` to `n + 1`.
const SCHEMA_STEPS: &[&str] = &["CREATE TABLE IF NOT EXISTS tasks (
    position INTEGER PRIMARY KEY,
    id TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    done INTEGER NOT NULL DEFAULT 0 CHECK (done IN (0, 1))
);"];

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = SCHEMA_STEPS.len() as u32;

const TASK_SELECT_SQL: &str = "SELECT id, title, done FROM tasks ORDER BY position ASC";
const TASK_INSERT_SQL: &str =
    "INSERT INTO tasks (position, id, title, done) VALUES (?1, ?2, ?3, ?4)";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracker repository backed by a SQLite database.
pub struct SqliteTrackerRepository {
    conn: Connection,
}

impl SqliteTrackerRepository {
    /// Opens the database file at `path`, creating it when missing.
    ///
    /// The parent directory must already exist.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::connect("file", || Connection::open(path))
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Self::connect("memory", Connection::open_in_memory)
    }

    /// Raw connection, for inspection and maintenance.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Version currently stamped into the open database.
    pub fn schema_version(&self) -> RepoResult<u32> {
        read_schema_version(&self.conn)
    }

    fn connect(
        mode: &'static str,
        open: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> RepoResult<Self> {
        let started_at = Instant::now();
        let result = open().map_err(RepoError::from).and_then(|mut conn| {
            prepare_schema(&mut conn)?;
            Ok(Self { conn })
        });

        match &result {
            Ok(_) => info!(
                "event=repo_open module=repo backend=sqlite mode={mode} status=ok schema_version={SCHEMA_VERSION} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=repo_open module=repo backend=sqlite mode={mode} status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn read_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(TASK_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn replace_tasks(&self, tracker: &Tracker) -> RepoResult<()> {
        ensure_unique_ids(tracker)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM tasks", [])?;
        {
            let mut insert = tx.prepare(TASK_INSERT_SQL)?;
            for (position, task) in tracker.iter().enumerate() {
                insert.execute(params![
                    position as i64,
                    task.id().to_string(),
                    task.title(),
                    task.is_done(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl TrackerRepository for SqliteTrackerRepository {
    fn load(&self) -> RepoResult<Tracker> {
        let started_at = Instant::now();
        let result = self.read_tasks().map(Tracker::with_tasks);

        match &result {
            Ok(tracker) => info!(
                "event=repo_load module=repo backend=sqlite status=ok tasks={} duration_ms={}",
                tracker.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=repo_load module=repo backend=sqlite status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn save(&self, tracker: &Tracker) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.replace_tasks(tracker);

        match &result {
            Ok(()) => info!(
                "event=repo_save module=repo backend=sqlite status=ok tasks={} duration_ms={}",
                tracker.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=repo_save module=repo backend=sqlite status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

/// Brings the task table up to `SCHEMA_VERSION` in one transaction.
fn prepare_schema(conn: &mut Connection) -> RepoResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;

    let found = read_schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(RepoError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &SCHEMA_STEPS[found as usize..] {
        tx.execute_batch(step)?;
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    info!(
        "event=repo_migrate module=repo backend=sqlite status=ok from_version={found} to_version={SCHEMA_VERSION}"
    );
    Ok(())
}

fn read_schema_version(conn: &Connection) -> RepoResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in tasks.id"))
    })?;

    let done = match row.get::<_, i64>("done")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid done value `{other}` in tasks.done"
            )));
        }
    };

    let title: String = row.get("title")?;
    Ok(Task::create(&title, done, Some(id))?)
}

#[cfg(test)]
mod tests {
    use super::{SqliteTrackerRepository, SCHEMA_VERSION};

    #[test]
    fn fresh_database_is_stamped_with_current_version() {
        let repo = SqliteTrackerRepository::open_in_memory().expect("open");
        assert_eq!(repo.schema_version().expect("version"), SCHEMA_VERSION);
    }
}
