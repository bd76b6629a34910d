//! Standard paths used by the watchlist tools

use std::path::PathBuf;

/// Application directory name under the platform data/config roots
pub const APP_DIR: &str = "anime-watchlist";

/// File name of the store when nothing else is configured
pub const DEFAULT_DB_FILE: &str = "anime_tracker.db";

/// Standard watchlist paths
#[derive(Debug, Clone)]
pub struct Paths {
    /// Data directory (~/.local/share/anime-watchlist)
    pub data: PathBuf,
    /// Config directory (~/.config/anime-watchlist)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join(APP_DIR);

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join(APP_DIR);

        Self { data, config }
    }

    /// Paths rooted somewhere other than the user's home (tests, portable installs)
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            data: root.join("data"),
            config: root.join("config"),
        }
    }

    /// Default location of the SQLite store
    pub fn database(&self) -> PathBuf {
        self.data.join(DEFAULT_DB_FILE)
    }

    /// Location of the config file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    /// Location of the interactive shell history
    pub fn history(&self) -> PathBuf {
        self.data.join("history.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_end_in_app_dir() {
        let paths = Paths::new();
        assert!(paths.data.ends_with(APP_DIR));
        assert!(paths.config.ends_with(APP_DIR));
        assert!(paths.database().ends_with(DEFAULT_DB_FILE));
    }

    #[test]
    fn test_rooted_paths() {
        let paths = Paths::rooted_at("/tmp/wl");
        assert_eq!(paths.database(), PathBuf::from("/tmp/wl/data/anime_tracker.db"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/wl/config/config.toml"));
        assert_eq!(paths.history(), PathBuf::from("/tmp/wl/data/history.txt"));
    }
}
