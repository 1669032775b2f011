use std::path::PathBuf;

use clap::Parser;

/// Default data file, relative to the working directory.
pub const DEFAULT_DB_FILE: &str = "tasks.json";

/// Menu-driven terminal task tracker.
/// Tasks are kept in ./tasks.json unless --db points elsewhere.
#[derive(Parser, Debug)]
#[command(name = "tt", version, about = "Menu-driven terminal task tracker")]
pub struct Cli {
    /// Path to the JSON data file.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Write diagnostics to this file. Logging is discarded when omitted.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Also log screen changes and individual saves.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The data file to open.
    pub fn db_path(&self) -> PathBuf {
        self.db
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
    }
}
