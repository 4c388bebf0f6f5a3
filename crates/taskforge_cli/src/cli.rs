//! CLI argument definitions.

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;
use taskforge_core::{StorageBackend, DEFAULT_DATA_PATH};

/// Taskforge - a personal task tracker.
#[derive(Parser, Debug)]
#[command(name = "taskforge")]
#[command(version, about = "Track personal tasks in a local JSON file", long_about = None)]
pub struct Cli {
    /// Task store location.
    #[arg(long = "data", global = true, env = "TASKFORGE_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Storage backend for the task store (json|sqlite).
    #[arg(long, global = true, env = "TASKFORGE_BACKEND", default_value = "json")]
    pub backend: StorageBackend,

    /// Log level (trace|debug|info|warn|error). Defaults by build mode.
    #[arg(long, global = true, env = "TASKFORGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true, env = "TASKFORGE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List tasks, numbered from 1
    List(ListArgs),

    /// Add a task
    Add {
        /// Task title (quote titles with spaces)
        title: String,
    },

    /// Mark a task done by ID (full or prefix)
    Done {
        /// Task ID (full UUID or unique prefix)
        id: String,
    },

    /// Mark a task undone by ID (full or prefix)
    Undone {
        /// Task ID (full UUID or unique prefix)
        id: String,
    },

    /// Toggle a task between done and undone by ID (full or prefix)
    Switch {
        /// Task ID (full UUID or unique prefix)
        id: String,
    },

    /// Remove one task by ID, or a bulk set
    Rm(RmArgs),
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    /// Only list done tasks
    #[arg(long, conflicts_with = "pending")]
    pub done: bool,

    /// Only list pending tasks
    #[arg(long)]
    pub pending: bool,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["id", "all", "done", "pending"])
))]
pub struct RmArgs {
    /// Task ID (full UUID or unique prefix)
    pub id: Option<String>,

    /// Remove every task (asks for confirmation)
    #[arg(long)]
    pub all: bool,

    /// Remove every done task
    #[arg(long)]
    pub done: bool,

    /// Remove every pending task (asks for confirmation)
    #[arg(long)]
    pub pending: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}
