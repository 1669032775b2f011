//! # tt - a menu-driven terminal task tracker
//!
//! Tasks carry a description, a status (`todo`, `in-progress`, `done`), a due
//! date and an ordered list of notes. Everything lives in a single JSON file
//! that is rewritten after every change.
//!
//! ## Quick Start
//!
//! ```bash
//! # Open ./tasks.json
//! tt
//!
//! # Use another data file and keep a log
//! tt --db ~/notes/tasks.json --log-file /tmp/tt.log
//! ```
//!
//! ## Screens
//!
//! - **Add Task**: description, then a due date (`YYYY-MM-DD`, `today`,
//!   `tomorrow`, `next week`, `friday`, `in 3d`...), then an optional note
//! - **List All Tasks**: mark done, toggle in-progress, delete, rename and
//!   reschedule from one table
//! - **View Notes**: add, edit and delete notes on a task
//! - **Completed Today** and **Due This Week**: derived views over the list
//!
//! An unreadable data file is copied aside to `<file>.json.corrupt` and the
//! session starts empty.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::process;
use std::sync::Mutex;

use clap::Parser;
use tracing::{info, level_filters::LevelFilter};

pub mod cli;
pub mod db;
pub mod due;
pub mod fields;
pub mod storage;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod render;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use db::Database;
use storage::JsonFileStorage;

/// Most verbose level written to the log.
fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Route `tracing` output to `log_file`, or discard it.
///
/// The terminal is owned by the interface, so nothing is ever logged to it.
fn init_logging(log_file: Option<&Path>, level: LevelFilter) -> io::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false);
    match log_file {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            let _ = builder.with_writer(Mutex::new(file)).try_init();
        }
        None => {
            let _ = builder.with_writer(io::sink).try_init();
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref(), log_level(cli.verbose)) {
        let path = cli.log_file.as_deref().unwrap_or(Path::new("-"));
        eprintln!("Failed to open log file {}: {}", path.display(), e);
        process::exit(1);
    }

    let db_path = cli.db_path();
    if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Failed to create data directory {}: {}", dir.display(), e);
            process::exit(1);
        }
    }

    info!(path = %db_path.display(), "starting");
    let (db, startup_error) = Database::open(Box::new(JsonFileStorage::new(db_path)));

    if let Err(e) = tui::run::run_tui(db, startup_error) {
        eprintln!("Terminal error: {}", e);
        process::exit(1);
    }
    info!("exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_enables_debug_events() {
        assert_eq!(log_level(false), LevelFilter::INFO);
        assert_eq!(log_level(true), LevelFilter::DEBUG);
        assert!(log_level(true) >= tracing::Level::DEBUG);
        assert!(log_level(false) < tracing::Level::DEBUG);
    }
}
