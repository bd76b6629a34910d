//! watchlist - Personal anime watchlist
//!
//! Keeps users, the anime on their lists and free-form tags in a single
//! SQLite file.
//!
//! Commands:
//! - create-schema: Create the tables (idempotent)
//! - add-user / add-anime / add-tag: Record things
//! - list-animes / list-users / list-tags / show-anime: Look at things
//! - delete-user / delete-tag / delete-anime: Remove things (with cascades)
//! - interactive: Shell that runs the same commands line by line

pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod repl;

pub use db::WatchlistDb;
pub use error::{Entity, StoreError, StoreResult};
