use taskforge_core::{
    open_repository, RepoError, SqliteTrackerRepository, StorageBackend, StoreConfig, Task,
    Tracker, TrackerRepository, SCHEMA_VERSION,
};
use uuid::Uuid;

#[test]
fn fresh_database_loads_empty_tracker() {
    let repo = SqliteTrackerRepository::open_in_memory().unwrap();
    assert!(repo.load().unwrap().is_empty());
}

#[test]
fn save_then_load_roundtrips_in_order() {
    let repo = SqliteTrackerRepository::open_in_memory().unwrap();
    let mut tracker = Tracker::new();
    let first = tracker.add_title("first").unwrap();
    tracker.add_title("second").unwrap();
    tracker.add_title("third").unwrap();
    tracker.mark_done_by_id(first.id()).unwrap();

    repo.save(&tracker).unwrap();
    let loaded = repo.load().unwrap();

    assert_eq!(loaded.len(), 3);
    for (left, right) in tracker.iter().zip(loaded.iter()) {
        assert_eq!(left.id(), right.id());
        assert_eq!(left.title(), right.title());
        assert_eq!(left.is_done(), right.is_done());
    }
}

#[test]
fn save_replaces_previous_rows() {
    let repo = SqliteTrackerRepository::open_in_memory().unwrap();
    let mut tracker = Tracker::new();
    let keep = tracker.add_title("keep").unwrap();
    let drop_me = tracker.add_title("drop").unwrap();
    repo.save(&tracker).unwrap();

    tracker.remove_by_id(drop_me.id()).unwrap();
    repo.save(&tracker).unwrap();

    let loaded = repo.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.all()[0].id(), keep.id());
}

#[test]
fn file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite3");
    let id = Uuid::new_v4();

    {
        let repo = SqliteTrackerRepository::open(&path).unwrap();
        let tracker = Tracker::with_tasks([Task::create("persisted", true, Some(id)).unwrap()]);
        repo.save(&tracker).unwrap();
    }

    let repo = SqliteTrackerRepository::open(&path).unwrap();
    assert_eq!(repo.schema_version().unwrap(), SCHEMA_VERSION);
    let loaded = repo.load().unwrap();
    let task = loaded.get_by_id(id).unwrap();
    assert_eq!(task.title(), "persisted");
    assert!(task.is_done());
}

#[test]
fn open_refuses_database_from_newer_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite3");
    {
        let repo = SqliteTrackerRepository::open(&path).unwrap();
        repo.save(&Tracker::with_tasks([Task::new("kept").unwrap()])).unwrap();
        repo.connection()
            .execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION + 1))
            .unwrap();
    }

    let err = SqliteTrackerRepository::open(&path).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UnsupportedSchemaVersion { db_version, latest_supported }
            if db_version == SCHEMA_VERSION + 1 && latest_supported == SCHEMA_VERSION
    ));
}

#[test]
fn task_table_rejects_out_of_range_done_flag() {
    let repo = SqliteTrackerRepository::open_in_memory().unwrap();
    let result = repo.connection().execute(
        "INSERT INTO tasks (position, id, title, done) VALUES (0, ?1, 'x', 2)",
        [Uuid::new_v4().to_string()],
    );

    assert!(result.is_err());
    assert!(repo.load().unwrap().is_empty());
}

#[test]
fn load_rejects_invalid_persisted_rows() {
    let repo = SqliteTrackerRepository::open_in_memory().unwrap();
    repo.connection()
        .execute(
            "INSERT INTO tasks (position, id, title, done) VALUES (0, 'not-a-uuid', 'x', 0)",
            [],
        )
        .unwrap();

    let err = repo.load().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("tasks.id")));

    repo.connection()
        .execute_batch(&format!(
            "DELETE FROM tasks; INSERT INTO tasks (position, id, title, done) VALUES (0, '{}', '   ', 0);",
            Uuid::new_v4()
        ))
        .unwrap();
    let err = repo.load().unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)), "unexpected error: {err}");
}

#[test]
fn save_rejects_duplicate_ids_without_touching_rows() {
    let repo = SqliteTrackerRepository::open_in_memory().unwrap();
    let mut tracker = Tracker::new();
    let original = tracker.add_title("original").unwrap();
    repo.save(&tracker).unwrap();

    tracker.add(Task::create("copy", false, Some(original.id())).unwrap());
    let err = repo.save(&tracker).unwrap_err();

    assert!(matches!(err, RepoError::DuplicateId(id) if id == original.id()));
    let loaded = repo.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get_by_id(original.id()).unwrap().title(), "original");
}

#[test]
fn open_repository_selects_configured_backend() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("store").join("tasks.db"), StorageBackend::Sqlite);

    let repo = open_repository(&config).unwrap();
    let mut tracker = Tracker::new();
    tracker.add_title("via config").unwrap();
    repo.save(&tracker).unwrap();

    assert!(config.data_path.is_file());
    assert_eq!(open_repository(&config).unwrap().load().unwrap().len(), 1);
}
