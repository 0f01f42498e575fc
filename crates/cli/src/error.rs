// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use kasbook_sync::RemoteError;
use thiserror::Error;

/// Errors reported by the `kasbook` CLI.
///
/// Messages carry a hint line where the fix is not obvious.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid field '{0}'\n  hint: use key=value, e.g. page=12 or title=\"Dune\"")]
    InvalidAssignment(String),

    #[error("no fields given\n  hint: pass one or more key=value pairs")]
    NoFields,

    #[error("{field} cannot be empty")]
    FieldEmpty { field: &'static str },

    #[error("book not cached: {0}")]
    BookNotCached(String),

    #[error("no progress recorded for {0}")]
    NoProgress(String),

    #[error("cannot replay the queue while offline\n  hint: configure [remote] url and drop --offline")]
    Offline,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Core(#[from] kasbook_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
