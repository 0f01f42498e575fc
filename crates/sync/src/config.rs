// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use crate::events::DEFAULT_EVENT_CAPACITY;

/// Quiescence window before a burst of progress updates is sent remotely.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(3_000);

/// Failed replays allowed before a queued mutation is dropped.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for the offline services.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Debounce window for progress syncs.
    pub debounce: Duration,
    /// Retry budget per queued mutation. An item is attempted at most
    /// `max_retries + 1` times.
    pub max_retries: u32,
    /// Initial connectivity state.
    pub start_online: bool,
    /// Buffered events per subscriber.
    pub event_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            debounce: DEFAULT_DEBOUNCE,
            max_retries: DEFAULT_MAX_RETRIES,
            start_online: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
