// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[derive(Parser, Debug)]
#[command(name = "kasbook")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and drive the KASBOOK offline reading cache")]
#[command(
    long_about = "Inspect and drive the KASBOOK offline reading cache.\n\n\
    Books, reading progress, notes and highlights are kept in a local store. \
    Writes that cannot reach the remote API are queued and replayed later."
)]
pub struct Cli {
    /// Use <path> as the state directory
    #[arg(long, global = true, value_name = "path")]
    pub state_dir: Option<PathBuf>,

    /// Treat the remote API as unreachable
    #[arg(long, global = true)]
    pub offline: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show cache size, queue length and connectivity
    Stats,

    /// Inspect or replay the offline mutation queue
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Manage cached books
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Read or update reading progress
    #[command(subcommand)]
    Progress(ProgressCommand),

    /// Add or list notes on a book
    #[command(subcommand)]
    Note(AnnotationCommand),

    /// Add or list highlights on a book
    #[command(subcommand)]
    Highlight(AnnotationCommand),

    /// Show or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum QueueCommand {
    /// List queued mutations in replay order
    List,
    /// Replay queued mutations now
    Flush,
    /// Discard every queued mutation
    Clear,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CacheCommand {
    /// List cached books, most recently read first
    List,
    /// Show one cached book
    Show { book: String },
    /// Cache a book from key=value fields
    Put {
        #[arg(value_parser = non_empty_string)]
        book: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Remove one cached book
    Remove { book: String },
    /// Remove all cached books, progress, notes and highlights
    Clear,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ProgressCommand {
    /// Show the local progress record
    Show { record: String },
    /// Merge key=value fields into a progress record and sync it
    Set {
        #[arg(value_parser = non_empty_string)]
        record: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum AnnotationCommand {
    /// Save one annotation and queue it for sync
    Add {
        #[arg(value_parser = non_empty_string)]
        book: String,
        /// Annotation text
        text: String,
        /// Extra key=value fields (e.g. page=12 color=yellow)
        #[arg(long = "field", short = 'f', value_name = "key=value")]
        fields: Vec<String>,
    },
    /// List annotations on a book, oldest first
    List { book: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file if none exists
    Init,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct FieldArgs {
    /// Fields as key=value; values that parse as JSON keep their type
    #[arg(required = true, value_name = "key=value")]
    pub fields: Vec<String>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
