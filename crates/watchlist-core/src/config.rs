//! Configuration loading
//!
//! Configuration file: ~/.config/anime-watchlist/config.toml
//!
//! ```toml
//! database = "/home/me/anime.db"
//! history = true
//! prompt = "watchlist> "
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::Paths;

/// Environment variable that overrides the configured store path
pub const DB_ENV_VAR: &str = "WATCHLIST_DB";

/// Watchlist configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Store file location (default: data dir)
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Persist interactive shell history
    #[serde(default = "default_history")]
    pub history: bool,

    /// Interactive shell prompt
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_history() -> bool {
    true
}

fn default_prompt() -> String {
    "watchlist> ".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            history: default_history(),
            prompt: default_prompt(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load(paths: &Paths) -> Result<Self> {
        Self::load_from(&paths.config_file())
    }

    /// Load configuration from a specific path, falling back to defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        Ok(config)
    }

    /// Resolve the store path.
    ///
    /// Precedence: explicit override, then `WATCHLIST_DB`, then the config
    /// file, then the default under the data directory.
    pub fn database_path(&self, paths: &Paths, explicit: Option<&Path>) -> PathBuf {
        let from_env = std::env::var_os(DB_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        resolve_database(explicit, from_env, self.database.as_deref(), paths)
    }
}

fn resolve_database(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    configured: Option<&Path>,
    paths: &Paths,
) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or(from_env)
        .or_else(|| configured.map(Path::to_path_buf))
        .unwrap_or_else(|| paths.database())
}
