//! CLI command definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// watchlist - Personal anime watchlist
#[derive(Parser, Debug)]
#[command(name = "watchlist")]
#[command(version)]
#[command(about = "Anime Watchlist Tracker - users, anime and tags in one SQLite file")]
#[command(after_help = r#"EXAMPLES:
    watchlist add-user Alice
    watchlist add-anime "Naruto" Action 220 --user-id 1
    watchlist add-tag 1 shounen
    watchlist list-animes
    watchlist delete-anime 1
    watchlist interactive

STORE:
    The database file is created on first use. Its location is, in order:
    --db, $WATCHLIST_DB, `database` in ~/.config/anime-watchlist/config.toml,
    ~/.local/share/anime-watchlist/anime_tracker.db

LOGGING:
    Set RUST_LOG=debug to trace store operations on stderr.
"#)]
pub struct Cli {
    /// Path to the SQLite store
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the database tables (safe to repeat)
    #[command(alias = "create-db")]
    CreateSchema,

    /// Add a new user
    AddUser {
        /// Display name
        name: String,
    },

    /// Add an anime to a user's list
    AddAnime {
        title: String,

        genre: String,

        /// Number of episodes
        total_episodes: u32,

        /// Owner of the entry
        #[arg(long = "user-id", alias = "user_id", default_value_t = 1)]
        user_id: i64,
    },

    /// Tag an anime, creating the tag if it doesn't exist yet
    AddTag {
        anime_id: i64,

        tag_name: String,
    },

    /// List all anime
    #[command(alias = "list")]
    ListAnimes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all users
    ListUsers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all tags
    ListTags {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one anime with its owner and tags
    ShowAnime {
        anime_id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a user and everything on their list
    DeleteUser { user_id: i64 },

    /// Delete a tag and remove it from every anime
    DeleteTag { tag_id: i64 },

    /// Delete an anime and its tag links
    DeleteAnime { anime_id: i64 },

    /// Start an interactive shell
    #[command(alias = "shell")]
    Interactive,
}
