// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! kasbook_cli - operator CLI for the KASBOOK offline reading layer.
//!
//! Opens the offline services over the local store in the state directory,
//! runs one command against them, then shuts them down so that pending
//! progress syncs are sent before the process exits.

mod cli;
mod commands;
mod env;

pub mod config;
pub mod error;

pub use cli::{
    AnnotationCommand, CacheCommand, Cli, Command, ConfigCommand, FieldArgs, ProgressCommand,
    QueueCommand,
};
pub use config::{resolve_state_dir, Config};
pub use error::{Error, Result};

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use kasbook_core::{AnnotationKind, KeyValueStore};
use kasbook_sync::{
    HttpRemoteApi, OfflineServices, RemoteApi, Severity, SyncEvent, UnconfiguredRemote,
};
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Execute a parsed command line, printing to stdout and stderr.
pub fn run(cli: Cli) -> Result<()> {
    let state_dir = resolve_state_dir(cli.state_dir.as_deref());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    runtime.block_on(run_in(&cli, &state_dir, &mut stdout, &mut stderr))
}

/// Execute `cli` against `state_dir`. Sync warnings go to `err`.
pub async fn run_in(
    cli: &Cli,
    state_dir: &Path,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    if let Command::Config(ConfigCommand::Init) = cli.command {
        return commands::config::init(state_dir, out);
    }

    let config = Config::load(state_dir)?;
    if let Command::Config(ConfigCommand::Show) = cli.command {
        return commands::config::show(&config, state_dir, cli.json, out);
    }

    fs::create_dir_all(state_dir)?;
    let services = open_services(&config, state_dir, cli.offline)?;
    let mut events = services.events().subscribe();

    let result = dispatch(&services, &cli.command, cli.json, out).await;
    services.shutdown().await;
    report_events(&mut events, err)?;
    result
}

fn open_services(config: &Config, state_dir: &Path, offline: bool) -> Result<OfflineServices> {
    let store = KeyValueStore::open(
        &config.database_path(state_dir),
        &config.fallback_path(state_dir),
    );
    let (remote, online): (Arc<dyn RemoteApi>, bool) = match config.remote_url() {
        Some(url) => {
            let mut api = HttpRemoteApi::new(url, config.timeout())?;
            if let Some(key) = config.api_key() {
                api = api.with_api_key(key);
            }
            (Arc::new(api), !offline)
        }
        None => {
            tracing::debug!("no remote configured, running offline");
            (Arc::new(UnconfiguredRemote), false)
        }
    };
    Ok(OfflineServices::start(
        config.sync_config(online),
        store,
        remote,
    ))
}

async fn dispatch(
    services: &OfflineServices,
    command: &Command,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Stats => commands::stats::run(services, json, out),
        Command::Queue(cmd) => match cmd {
            QueueCommand::List => commands::queue::list(services, json, out),
            QueueCommand::Flush => commands::queue::flush(services, json, out).await,
            QueueCommand::Clear => commands::queue::clear(services, json, out),
        },
        Command::Cache(cmd) => match cmd {
            CacheCommand::List => commands::cache::list(services, json, out),
            CacheCommand::Show { book } => commands::cache::show(services, book, json, out),
            CacheCommand::Put { book, fields } => {
                commands::cache::put(services, book, &fields.fields, json, out)
            }
            CacheCommand::Remove { book } => commands::cache::remove(services, book, json, out),
            CacheCommand::Clear => commands::cache::clear(services, json, out),
        },
        Command::Progress(cmd) => match cmd {
            ProgressCommand::Show { record } => {
                commands::progress::show(services, record, json, out)
            }
            ProgressCommand::Set { record, fields } => {
                commands::progress::set(services, record, &fields.fields, json, out)
            }
        },
        Command::Note(cmd) => annotation(services, AnnotationKind::Note, cmd, json, out).await,
        Command::Highlight(cmd) => {
            annotation(services, AnnotationKind::Highlight, cmd, json, out).await
        }
        // Handled before the services are opened.
        Command::Config(_) => Ok(()),
    }
}

async fn annotation(
    services: &OfflineServices,
    kind: AnnotationKind,
    command: &AnnotationCommand,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        AnnotationCommand::Add { book, text, fields } => {
            commands::annotation::add(services, kind, book, text, fields, json, out).await
        }
        AnnotationCommand::List { book } => {
            commands::annotation::list(services, kind, book, json, out)
        }
    }
}

/// Print buffered warnings and errors, the CLI's stand-in for toasts.
fn report_events(
    events: &mut broadcast::Receiver<SyncEvent>,
    err: &mut impl Write,
) -> std::io::Result<()> {
    loop {
        match events.try_recv() {
            Ok(event) => {
                let label = match event.severity() {
                    Severity::Info => continue,
                    Severity::Warning => "warning",
                    Severity::Error => "error",
                };
                writeln!(err, "{}: {}", label, event)?;
            }
            Err(TryRecvError::Lagged(skipped)) => {
                writeln!(err, "warning: {} sync events not shown", skipped)?;
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
