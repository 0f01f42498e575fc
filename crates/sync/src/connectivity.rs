// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline signal.
//!
//! Stands in for the platform's connectivity notifications. The host flips
//! it with [`Connectivity::set_online`]; watchers only wake on transitions.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared connectivity flag. Cheap to clone; clones observe the same state.
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        Connectivity { tx: Arc::new(tx) }
    }

    /// Whether the client currently believes it is online.
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Update the flag. Returns true if this was a transition.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            tracing::info!(online, "connectivity changed");
        }
        changed
    }

    /// Receiver that wakes on every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn status_string(&self) -> &'static str {
        if self.is_online() {
            "online"
        } else {
            "offline"
        }
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
