//! Watchlist Core - Shared functionality for the anime watchlist tools
//!
//! Owns where things live on disk and how the user configures them.
//! Knows nothing about users, anime or tags.

pub mod config;
pub mod paths;

pub use config::Config;
pub use paths::Paths;
