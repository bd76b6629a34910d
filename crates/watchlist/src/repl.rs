//! Interactive shell
//!
//! Reads one line at a time, splits it into words and hands them to the same
//! clap parser the command line uses. Commands run strictly one after another
//! against the store that was opened at startup.

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};
use watchlist_core::{Config, Paths};

use crate::cli::Cli;
use crate::commands;
use crate::db::WatchlistDb;

/// What the shell should do after one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Print command output and keep reading
    Print(String),
    /// Print an error and keep reading
    Error(String),
    /// Nothing to print
    Empty,
    /// Leave the shell
    Quit,
}

/// Run the interactive shell until `exit` or end of input
pub fn run(db: &mut WatchlistDb, config: &Config, paths: &Paths) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let history_path = paths.history();

    if config.history {
        let _ = rl.load_history(&history_path);
    }

    println!("Anime watchlist shell. Type 'help' for commands, 'exit' to quit.");

    loop {
        match rl.readline(&config.prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }

                match dispatch_line(db, &line) {
                    Step::Print(text) => println!("{}", text),
                    Step::Error(text) => eprintln!("{} {}", "Error:".red(), text),
                    Step::Empty => {}
                    Step::Quit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C - cancel current input
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D - exit
                break;
            }
            Err(err) => {
                eprintln!("{} {:?}", "Error:".red(), err);
                break;
            }
        }
    }

    if config.history {
        if let Some(parent) = history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = rl.save_history(&history_path) {
            warn!("failed to save shell history: {}", e);
        }
    }

    Ok(())
}

/// Handle a single shell line
pub fn dispatch_line(db: &mut WatchlistDb, line: &str) -> Step {
    let line = line.trim();

    match line {
        "" => return Step::Empty,
        "exit" | "quit" | "q" => return Step::Quit,
        "help" | "?" => return Step::Print(Cli::command().render_help().to_string()),
        _ => {}
    }

    let words = match split_words(line) {
        Ok(words) => words,
        Err(e) => return Step::Error(e.to_string()),
    };
    debug!(?words, "shell command");

    let cli = match Cli::try_parse_from(std::iter::once("watchlist".to_string()).chain(words)) {
        Ok(cli) => cli,
        // Covers usage errors as well as --help / --version output
        Err(e) => return Step::Print(e.to_string().trim_end().to_string()),
    };

    let Some(command) = cli.command else {
        return Step::Empty;
    };

    match commands::execute(db, &command) {
        Ok(output) => Step::Print(output),
        Err(e) => Step::Error(format!("{:#}", e)),
    }
}

/// Split a line into words.
///
/// Whitespace separates words. Single quotes keep everything literal, double
/// quotes group but honor backslash escapes, and a backslash outside single
/// quotes escapes the next character.
pub fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => bail!("unterminated single quote"),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch) => current.push(ch),
                            None => bail!("unterminated double quote"),
                        },
                        Some(ch) => current.push(ch),
                        None => bail!("unterminated double quote"),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(ch) => current.push(ch),
                    None => bail!("trailing backslash"),
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}
