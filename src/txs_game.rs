// Game settings and configuration loading
// Settings are the typed board parameters; Config is read from a TOML file

use crate::txs_board::{Board, BoardError};
use directories::ProjectDirs;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Board parameters for a new game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub height: usize,
    pub width: usize,
    pub mine_count: usize,
}

impl Default for GameSettings {
    /// Quick game: 5x5 with 5 mines
    fn default() -> Self {
        GameSettings {
            height: 5,
            width: 5,
            mine_count: 5,
        }
    }
}

impl GameSettings {
    pub fn new(height: usize, width: usize, mine_count: usize) -> Self {
        GameSettings {
            height,
            width,
            mine_count,
        }
    }

    /// Build a fresh board for these settings
    pub fn build_board<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Board, BoardError> {
        Board::with_rng(self.height, self.width, self.mine_count, rng)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// User configuration, read from disk as TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Settings used by "Create new game"
    pub game: GameSettings,

    pub ascii_icons: bool,          // Use ASCII glyphs instead of symbols
    pub language: String,           // Language code or locale ("en", "zh", "zh-CN")
    pub seed: Option<u64>,          // Fixed RNG seed for reproducible games
    pub log_filter: Option<String>, // tracing filter directive, RUST_LOG wins
}

impl Default for Config {
    fn default() -> Self {
        Config {
            game: GameSettings::default(),
            ascii_icons: false,
            // system locale (e.g. "zh-CN"), mapped to a language by Lang::new
            language: sys_locale::get_locale().unwrap_or_else(|| "en".to_string()),
            seed: None,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn from_toml(s: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str::<Config>(s)?)
    }

    /// Read a config file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        match fs::read_to_string(path) {
            Ok(s) => Config::from_toml(&s),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Config::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Per-project directories (e.g. ~/.config/txswpr on Linux)
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "xhbl", "txswpr")
}

/// Default config file location, falls back to the current directory
pub fn config_path() -> Option<PathBuf> {
    match project_dirs() {
        Some(proj) => Some(proj.config_dir().join("txswpr.toml")),
        None => std::env::current_dir().ok().map(|d| d.join("txswpr.toml")),
    }
}

/// Load the configuration from `path` (or the default location)
/// Any error is logged and the defaults are used instead
pub fn load_config(path: Option<&Path>) -> Config {
    let path = match path.map(Path::to_path_buf).or_else(config_path) {
        Some(p) => p,
        None => return Config::default(),
    };
    match Config::load(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config ignored");
            Config::default()
        }
    }
}
