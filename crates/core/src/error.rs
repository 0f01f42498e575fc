// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for kasbook-core operations.

use thiserror::Error;

/// All possible errors that can occur in kasbook-core operations.
///
/// Storage errors never reach callers of [`crate::KeyValueStore`]; they are
/// produced by the backends and absorbed by the fail-soft facade.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown queued action: '{0}'\n  hint: valid actions are: updateProgress, saveNote, saveHighlight, updateRecord")]
    UnknownAction(String),

    #[error("invalid payload for {action}: {reason}")]
    InvalidPayload { action: String, reason: String },

    #[error("storage backend '{backend}' unavailable: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for kasbook-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
