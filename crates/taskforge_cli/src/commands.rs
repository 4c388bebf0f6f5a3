//! Command handlers: translate parsed arguments into tracker calls.
//!
//! # Invariants
//! - Every handler loads once and saves at most once.
//! - Lookups and validation run before any mutation; on error nothing is saved.
//! - A declined confirmation leaves the store untouched.

use crate::cli::{Commands, ListArgs, RmArgs};
use crate::prompt::Confirm;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use taskforge_core::{
    RepoError, Task, TaskId, Tracker, TrackerError, TrackerRepository, TrackerResult,
};

pub type CommandResult<T> = Result<T, CommandError>;

/// Failure of one CLI command, rendered as a single user-facing line.
#[derive(Debug)]
pub enum CommandError {
    Tracker(TrackerError),
    Repo(RepoError),
    /// Writing output or reading a prompt answer failed.
    Io(io::Error),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tracker(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Tracker(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<TrackerError> for CommandError {
    fn from(value: TrackerError) -> Self {
        Self::Tracker(value)
    }
}

impl From<RepoError> for CommandError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<io::Error> for CommandError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Runs one parsed command against `repo`.
pub fn run_command(
    command: Commands,
    repo: &dyn TrackerRepository,
    out: &mut dyn Write,
    confirm: &mut dyn Confirm,
) -> CommandResult<()> {
    let mut tracker = repo.load()?;

    match command {
        Commands::List(args) => list(&tracker, &args, out),
        Commands::Add { title } => {
            let task = tracker.add_title(&title)?;
            repo.save(&tracker)?;
            info!("event=task_add module=cli status=ok task_id={}", task.id());
            writeln!(out, "Added: {task}")?;
            Ok(())
        }
        Commands::Done { id } => {
            update_one(repo, &mut tracker, &id, "Done", out, Tracker::mark_done_by_id)
        }
        Commands::Undone { id } => {
            update_one(repo, &mut tracker, &id, "Undone", out, Tracker::mark_undone_by_id)
        }
        Commands::Switch { id } => {
            update_one(repo, &mut tracker, &id, "Switched", out, Tracker::switch_done_by_id)
        }
        Commands::Rm(args) => remove(repo, &mut tracker, &args, out, confirm),
    }
}

fn list(tracker: &Tracker, args: &ListArgs, out: &mut dyn Write) -> CommandResult<()> {
    let tasks = if args.done {
        tracker.done()
    } else if args.pending {
        tracker.pending()
    } else {
        tracker.all()
    };

    if tasks.is_empty() {
        writeln!(out, "No tasks yet")?;
        return Ok(());
    }

    for (index, task) in tasks.iter().enumerate() {
        writeln!(out, "{}. {task}", index + 1)?;
    }
    Ok(())
}

fn update_one(
    repo: &dyn TrackerRepository,
    tracker: &mut Tracker,
    reference: &str,
    label: &str,
    out: &mut dyn Write,
    apply: for<'a> fn(&'a mut Tracker, TaskId) -> TrackerResult<&'a Task>,
) -> CommandResult<()> {
    let id = tracker.resolve_id(reference)?;
    let line = apply(tracker, id)?.to_string();
    repo.save(tracker)?;
    info!(
        "event=task_update module=cli status=ok action={} task_id={id}",
        label.to_ascii_lowercase()
    );
    writeln!(out, "{label}: {line}")?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulkScope {
    All,
    Pending,
    Done,
}

impl BulkScope {
    fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Done => "done",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Pending => " pending",
            Self::Done => " done",
        }
    }
}

fn remove(
    repo: &dyn TrackerRepository,
    tracker: &mut Tracker,
    args: &RmArgs,
    out: &mut dyn Write,
    confirm: &mut dyn Confirm,
) -> CommandResult<()> {
    if let Some(reference) = args.id.as_deref() {
        let id = tracker.resolve_id(reference)?;
        let task = tracker.remove_by_id(id)?;
        repo.save(tracker)?;
        info!("event=task_remove module=cli status=ok task_id={id}");
        writeln!(out, "Removed: {task}")?;
        return Ok(());
    }

    let scope = if args.all {
        BulkScope::All
    } else if args.pending {
        BulkScope::Pending
    } else {
        BulkScope::Done
    };
    let candidates = match scope {
        BulkScope::All => tracker.len(),
        BulkScope::Pending => tracker.pending().len(),
        BulkScope::Done => tracker.done().len(),
    };

    let needs_confirmation = scope != BulkScope::Done && !args.yes && candidates > 0;
    if needs_confirmation
        && !confirm.confirm(&format!("Remove {candidates}{} task(s)?", scope.suffix()))?
    {
        writeln!(out, "Aborted")?;
        return Ok(());
    }

    let removed = match scope {
        BulkScope::All => tracker.clear(),
        BulkScope::Pending => tracker.remove_all_pending(),
        BulkScope::Done => tracker.remove_all_done(),
    };
    repo.save(tracker)?;
    info!(
        "event=task_remove_bulk module=cli status=ok scope={} removed={removed}",
        scope.as_str()
    );
    writeln!(out, "Removed {removed}{} task(s)", scope.suffix())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run_command, CommandError};
    use crate::cli::{Commands, ListArgs, RmArgs};
    use crate::prompt::Confirm;
    use std::io;
    use taskforge_core::{
        InMemoryTrackerRepository, Task, TaskId, Tracker, TrackerError, TrackerRepository,
    };

    /// Answers every question with a fixed value and counts how often it was asked.
    struct ScriptedConfirm {
        answer: bool,
        asked: usize,
    }

    impl ScriptedConfirm {
        fn new(answer: bool) -> Self {
            Self { answer, asked: 0 }
        }
    }

    impl Confirm for ScriptedConfirm {
        fn confirm(&mut self, _question: &str) -> io::Result<bool> {
            self.asked += 1;
            Ok(self.answer)
        }
    }

    fn run(
        repo: &InMemoryTrackerRepository,
        command: Commands,
        confirm: &mut ScriptedConfirm,
    ) -> Result<String, CommandError> {
        let mut out = Vec::new();
        run_command(command, repo, &mut out, confirm)?;
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }

    fn seeded(tasks: &[(&str, bool)]) -> (InMemoryTrackerRepository, Vec<Task>) {
        let tracker = Tracker::with_tasks(
            tasks
                .iter()
                .map(|(title, done)| Task::create(title, *done, None).expect("task")),
        );
        (InMemoryTrackerRepository::seeded(&tracker), tracker.all())
    }

    fn titles(repo: &InMemoryTrackerRepository) -> Vec<String> {
        repo.load()
            .expect("load")
            .iter()
            .map(|task| task.title().to_string())
            .collect()
    }

    #[test]
    fn list_on_empty_store_says_no_tasks() {
        let repo = InMemoryTrackerRepository::new();
        let output = run(
            &repo,
            Commands::List(ListArgs::default()),
            &mut ScriptedConfirm::new(true),
        )
        .expect("list");
        assert_eq!(output, "No tasks yet\n");
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn list_numbers_tasks_from_one_and_applies_filters() {
        let (repo, tasks) = seeded(&[("Buy milk", true), ("Study", false)]);
        let mut confirm = ScriptedConfirm::new(true);

        let output = run(&repo, Commands::List(ListArgs::default()), &mut confirm).expect("list");
        assert_eq!(output, format!("1. {}\n2. {}\n", tasks[0], tasks[1]));

        let pending = ListArgs {
            pending: true,
            ..ListArgs::default()
        };
        let output = run(&repo, Commands::List(pending), &mut confirm).expect("list");
        assert_eq!(output, format!("1. {}\n", tasks[1]));

        let done = ListArgs {
            done: true,
            ..ListArgs::default()
        };
        let output = run(&repo, Commands::List(done), &mut confirm).expect("list");
        assert!(output.starts_with("1. [Done]"));
    }

    #[test]
    fn add_persists_and_reports_task() {
        let repo = InMemoryTrackerRepository::new();
        let output = run(
            &repo,
            Commands::Add {
                title: "  Buy milk ".to_string(),
            },
            &mut ScriptedConfirm::new(true),
        )
        .expect("add");

        assert!(output.starts_with("Added: [Undone] ("));
        assert!(output.ends_with(") Buy milk\n"));
        assert_eq!(titles(&repo), ["Buy milk"]);
        assert_eq!(repo.save_count(), 1);
    }

    #[test]
    fn add_blank_title_fails_without_saving() {
        let repo = InMemoryTrackerRepository::new();
        let err = run(
            &repo,
            Commands::Add {
                title: "   ".to_string(),
            },
            &mut ScriptedConfirm::new(true),
        )
        .unwrap_err();

        assert!(matches!(err, CommandError::Tracker(TrackerError::Validation(_))));
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn done_undone_and_switch_resolve_short_ids() {
        let (repo, tasks) = seeded(&[("A", false)]);
        let short = tasks[0].short_id();
        let mut confirm = ScriptedConfirm::new(true);

        let output = run(&repo, Commands::Done { id: short.clone() }, &mut confirm).expect("done");
        assert!(output.starts_with("Done: [Done]"));
        assert!(repo.load().expect("load").all()[0].is_done());

        let output =
            run(&repo, Commands::Undone { id: short.clone() }, &mut confirm).expect("undone");
        assert!(output.starts_with("Undone: [Undone]"));

        let output = run(
            &repo,
            Commands::Switch {
                id: tasks[0].id().to_string(),
            },
            &mut confirm,
        )
        .expect("switch");
        assert!(output.starts_with("Switched: [Done]"));
        assert_eq!(repo.save_count(), 3);
    }

    #[test]
    fn unknown_and_ambiguous_references_fail_without_saving() {
        let first = TaskId::parse_str("abc11111-0000-4000-8000-000000000001").expect("uuid");
        let second = TaskId::parse_str("abc22222-0000-4000-8000-000000000002").expect("uuid");
        let tracker = Tracker::with_tasks([
            Task::create("first", false, Some(first)).expect("task"),
            Task::create("second", false, Some(second)).expect("task"),
        ]);
        let repo = InMemoryTrackerRepository::seeded(&tracker);
        let mut confirm = ScriptedConfirm::new(true);

        let err = run(&repo, Commands::Done { id: "abc".to_string() }, &mut confirm).unwrap_err();
        assert_eq!(err.to_string(), "ambiguous id prefix `abc` (matches 2)");

        let rm_unknown = Commands::Rm(RmArgs {
            id: Some("fff".to_string()),
            ..RmArgs::default()
        });
        let err = run(&repo, rm_unknown, &mut confirm).unwrap_err();
        assert!(matches!(err, CommandError::Tracker(TrackerError::NoMatch(_))));

        let missing = TaskId::new_v4();
        let err = run(&repo, Commands::Switch { id: missing.to_string() }, &mut confirm)
            .unwrap_err();
        assert!(matches!(err, CommandError::Tracker(TrackerError::NotFound(id)) if id == missing));

        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn rm_by_id_removes_single_task() {
        let (repo, tasks) = seeded(&[("A", false), ("B", false), ("C", true)]);
        let output = run(
            &repo,
            Commands::Rm(RmArgs {
                id: Some(tasks[1].short_id()),
                ..RmArgs::default()
            }),
            &mut ScriptedConfirm::new(false),
        )
        .expect("rm");

        assert_eq!(output, format!("Removed: {}\n", tasks[1]));
        assert_eq!(titles(&repo), ["A", "C"]);
    }

    #[test]
    fn rm_done_never_prompts() {
        let (repo, _) = seeded(&[("p1", false), ("d1", true), ("p2", false), ("d2", true)]);
        let mut confirm = ScriptedConfirm::new(false);

        let output = run(
            &repo,
            Commands::Rm(RmArgs {
                done: true,
                ..RmArgs::default()
            }),
            &mut confirm,
        )
        .expect("rm --done");

        assert_eq!(output, "Removed 2 done task(s)\n");
        assert_eq!(confirm.asked, 0);
        assert_eq!(titles(&repo), ["p1", "p2"]);
    }

    #[test]
    fn rm_all_declined_leaves_store_untouched() {
        let (repo, _) = seeded(&[("A", false), ("B", true)]);
        let mut confirm = ScriptedConfirm::new(false);

        let output = run(
            &repo,
            Commands::Rm(RmArgs {
                all: true,
                ..RmArgs::default()
            }),
            &mut confirm,
        )
        .expect("rm --all");

        assert_eq!(output, "Aborted\n");
        assert_eq!(confirm.asked, 1);
        assert_eq!(repo.save_count(), 0);
        assert_eq!(titles(&repo), ["A", "B"]);
    }

    #[test]
    fn rm_pending_confirmed_or_bypassed_removes_pending() {
        let (repo, _) = seeded(&[("p1", false), ("d1", true), ("p2", false)]);
        let mut confirm = ScriptedConfirm::new(true);

        let output = run(
            &repo,
            Commands::Rm(RmArgs {
                pending: true,
                ..RmArgs::default()
            }),
            &mut confirm,
        )
        .expect("rm --pending");
        assert_eq!(output, "Removed 2 pending task(s)\n");
        assert_eq!(confirm.asked, 1);
        assert_eq!(titles(&repo), ["d1"]);

        let mut never = ScriptedConfirm::new(false);
        let output = run(
            &repo,
            Commands::Rm(RmArgs {
                all: true,
                yes: true,
                ..RmArgs::default()
            }),
            &mut never,
        )
        .expect("rm --all --yes");
        assert_eq!(output, "Removed 1 task(s)\n");
        assert_eq!(never.asked, 0);
        assert!(titles(&repo).is_empty());
    }
}
