// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Observable outcomes of offline sync.
//!
//! What a browser client shows as toasts is published here as [`SyncEvent`]s
//! on a broadcast bus. Every event is also logged through `tracing` at a
//! level matching its [`Severity`], so a host without subscribers still sees
//! failures in its logs.

use std::fmt;

use kasbook_core::{StoreEvent, StoreObserver};
use tokio::sync::broadcast;

/// Default number of events buffered for slow subscribers.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// How loudly an event should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Something the hosting application may want to show or count.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A debounced progress write reached the remote API.
    ProgressSynced { record_id: String },
    /// A progress write failed and was handed to the offline queue.
    ProgressDeferred { record_id: String, error: String },
    /// A mutation was persisted to the offline queue.
    MutationQueued { id: String, action: String },
    /// A queued mutation was replayed successfully and removed.
    MutationReplayed { id: String, action: String },
    /// A queued mutation failed and stays queued for another attempt.
    MutationRetrying {
        id: String,
        action: String,
        attempts: u32,
        error: String,
    },
    /// A queued mutation exhausted its retry budget and was discarded.
    MutationDropped {
        id: String,
        action: String,
        attempts: u32,
        error: String,
    },
    /// The local store absorbed a failure.
    StorageFailure {
        backend: &'static str,
        op: String,
        key: String,
        error: String,
        /// False when the fallback store took over and nothing was lost.
        unrecovered: bool,
    },
}

impl SyncEvent {
    pub fn severity(&self) -> Severity {
        match self {
            SyncEvent::ProgressSynced { .. }
            | SyncEvent::MutationQueued { .. }
            | SyncEvent::MutationReplayed { .. } => Severity::Info,
            SyncEvent::ProgressDeferred { .. } | SyncEvent::MutationRetrying { .. } => {
                Severity::Warning
            }
            SyncEvent::MutationDropped { .. } => Severity::Error,
            SyncEvent::StorageFailure { unrecovered, .. } => {
                if *unrecovered {
                    Severity::Error
                } else {
                    Severity::Warning
                }
            }
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncEvent::ProgressSynced { .. } => write!(f, "Reading progress saved"),
            SyncEvent::ProgressDeferred { .. } => {
                write!(f, "Progress saved offline; it will sync when you're back online")
            }
            SyncEvent::MutationQueued { action, .. } => write!(f, "Queued {action} for sync"),
            SyncEvent::MutationReplayed { action, .. } => write!(f, "Synced {action}"),
            SyncEvent::MutationRetrying {
                action, attempts, ..
            } => write!(f, "Sync of {action} failed (attempt {attempts}); will retry"),
            SyncEvent::MutationDropped {
                action,
                attempts,
                error,
                ..
            } => write!(f, "Failed to sync {action} after {attempts} attempts: {error}"),
            SyncEvent::StorageFailure { op, key, error, .. } => {
                write!(f, "Local storage {op} failed for '{key}': {error}")
            }
        }
    }
}

/// Broadcast bus for [`SyncEvent`]s. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        EventBus { tx }
    }

    /// Subscribe to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    /// Log and publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: SyncEvent) {
        match event.severity() {
            Severity::Info => tracing::info!(event = ?event, "{}", event),
            Severity::Warning => tracing::warn!(event = ?event, "{}", event),
            Severity::Error => tracing::error!(event = ?event, "{}", event),
        }
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl StoreObserver for EventBus {
    fn on_store_event(&self, event: &StoreEvent) {
        self.emit(SyncEvent::StorageFailure {
            backend: event.backend,
            op: event.op.to_string(),
            key: event.key.clone(),
            error: event.error.clone(),
            unrecovered: event.unrecovered,
        });
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
