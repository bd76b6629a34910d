//! watchlist - Personal anime watchlist
//!
//! Usage:
//!   watchlist add-user NAME
//!   watchlist add-anime TITLE GENRE EPISODES [--user-id ID]
//!   watchlist add-tag ANIME_ID TAG
//!   watchlist list-animes
//!   watchlist interactive

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use watchlist_core::{Config, Paths};

use watchlist::cli::{Cli, Commands};
use watchlist::{commands, repl, WatchlistDb};

fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("watchlist - Anime Watchlist Tracker");
        println!();
        println!("Use 'watchlist --help' for usage information");
        println!("Use 'watchlist interactive' to start a shell");
        return Ok(());
    };

    let paths = Paths::new();
    let config = Config::load(&paths)?;
    let db_path = config.database_path(&paths, cli.db.as_deref());

    let mut db = WatchlistDb::open(&db_path)
        .with_context(|| format!("Failed to open watchlist database: {}", db_path.display()))?;

    match command {
        Commands::Interactive => repl::run(&mut db, &config, &paths),
        command => {
            let output = commands::execute(&mut db, &command)?;
            println!("{}", output);
            Ok(())
        }
    }
}
