//! Diagnostic log files
//!
//! The terminal belongs to the UI, so logs go to two files in the home directory: one
//! that keeps growing across runs and one holding only the current run.

use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Append-only log, kept across runs
pub const LOG_FILE: &str = ".nvgrid-logs";

/// Log of the current run, truncated on start
pub const SESSION_LOG_FILE: &str = ".nvgrid-logs.0";

/// Millisecond timestamps
const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Both log files, opened
#[derive(Debug)]
pub struct LogFiles {
    pub append: File,
    pub session: File,
}

/// Open (creating if needed) the log files in `dir`
pub fn open_log_files(dir: &Path) -> Result<LogFiles> {
    let path = dir.join(LOG_FILE);
    let append = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let path = dir.join(SESSION_LOG_FILE);
    let session = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    Ok(LogFiles { append, session })
}

/// Install the global subscriber writing every event to both log files
pub fn init(config: &Config) -> Result<()> {
    let files = open_log_files(&config.log_dir)?;
    let writer = Mutex::new(files.append).and(Mutex::new(files.session));

    let filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("Invalid log filter `{}`", config.log_filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
