// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fs;
use std::path::Path;

use clap::Parser;
use kasbook_cli::{resolve_state_dir, Cli};

const LOG_FILE_NAME: &str = "kasbook.log";

fn main() {
    let cli = Cli::parse();
    let state_dir = resolve_state_dir(cli.state_dir.as_deref());
    setup_logging(&state_dir.join(LOG_FILE_NAME));
    tracing::debug!(state_dir = %state_dir.display(), command = ?cli.command, "kasbook starting");

    if let Err(e) = kasbook_cli::run(cli) {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Log to a file in the state directory so stdout stays clean for command
/// output. Falls back to stderr if the file cannot be opened.
fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = log_path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| {
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
        });
    match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}
