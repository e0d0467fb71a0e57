// Logging setup
// The UI owns the terminal, so tracing output goes to a file instead of stderr

use crate::txs_game::project_dirs;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Error, Debug)]
pub enum LogError {
    #[error("cannot open log file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("logger already installed: {0}")]
    Init(#[from] TryInitError),
}

const DEFAULT_FILTER: &str = "warn";

/// Log file location (e.g. ~/.local/share/txswpr/txswpr.log on Linux)
pub fn log_path() -> PathBuf {
    match project_dirs() {
        Some(proj) => proj.data_dir().join("txswpr.log"),
        None => std::env::temp_dir().join("txswpr.log"),
    }
}

/// Filter to use when RUST_LOG is not set
fn fallback_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::new(configured.unwrap_or(DEFAULT_FILTER))
}

// Create the parent directory and open the file for appending
fn open_log(path: &Path) -> Result<File, LogError> {
    let io_err = |source| LogError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)
}

/// Install the global subscriber, returning the log file path
/// Callers treat an error as "run without logs"
pub fn init(configured: Option<&str>) -> Result<PathBuf, LogError> {
    let path = log_path();
    let file = open_log(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback_filter(configured));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()?;
    Ok(path)
}
