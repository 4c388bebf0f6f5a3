//! Taskforge command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment.
//! - Open the configured repository and dispatch one command.
//! - Render failures as one `Error: ...` line and exit non-zero.

mod cli;
mod commands;
mod prompt;

use clap::Parser;
use cli::Cli;
use log::error;
use std::io;
use std::path::PathBuf;
use std::process;
use taskforge_core::{default_log_level, init_logging, open_repository, StoreConfig};

fn main() {
    let cli = Cli::parse();

    if let Some(log_dir) = resolve_log_dir(cli.log_dir.clone()) {
        let level = resolve_level(cli.log_level.as_deref());
        if let Err(message) = init_logging(level, &log_dir) {
            eprintln!("Warning: logging disabled: {message}");
        }
    }

    let config = StoreConfig::new(cli.data_path, cli.backend);
    let result = open_repository(&config)
        .map_err(commands::CommandError::from)
        .and_then(|repo| {
            let stdout = io::stdout();
            commands::run_command(
                cli.command,
                &*repo,
                &mut stdout.lock(),
                &mut prompt::StdinConfirm,
            )
        });

    if let Err(err) = result {
        error!("event=command module=cli status=error error={err}");
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

/// Explicit `--log-level` wins; otherwise the build-mode default.
fn resolve_level(explicit: Option<&str>) -> &str {
    explicit.unwrap_or_else(|| default_log_level())
}

/// Explicit `--log-dir` wins; otherwise the platform local data directory.
fn resolve_log_dir(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| dirs::data_local_dir().map(|dir| dir.join("taskforge").join("logs")))
}
