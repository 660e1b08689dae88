//! Log file setup.
//!
//! The terminal is in raw mode while flourish runs, so `tracing` output goes
//! to a file in the platform data directory instead of stderr.

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use flourish_config::Config;
use tracing_subscriber::EnvFilter;

/// Name of the log file inside the data directory.
const LOG_FILE: &str = "flourish.log";

/// Install the global subscriber. `RUST_LOG` takes precedence over
/// `default_level`. Returns the log path, or `None` when logging could not
/// be set up; flourish runs fine without it.
pub fn init(default_level: &str) -> Option<PathBuf> {
    let dir = Config::project_dirs()?.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok()?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(path)
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
