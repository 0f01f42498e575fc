// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! kasbook-sync: offline caching and deferred sync for the KASBOOK reader.
//!
//! # Architecture
//!
//! ```text
//!  host / CLI
//!     │ cache_book, save_note          │ update_progress
//!     ▼                                ▼
//!  OfflineBookCache          ProgressSyncCoordinator ──debounced──► RemoteApi
//!     │                                │ on failure                    ▲
//!     │                                ▼                               │
//!     │                      OfflineMutationQueue ────replay───────────┘
//!     │                                │        ▲
//!     ▼                                ▼        │ offline → online
//!  KeyValueStore ◄─────────────────────┘   Connectivity
//! ```
//!
//! Failures never reach the caller as errors: storage failures fall back and
//! remote failures are queued. Both are published on the [`EventBus`].
//!
//! Conflicts resolve last-write-wins using client clocks. Concurrent edits
//! from several devices overwrite each other.

pub mod cache;
pub mod config;
pub mod connectivity;
pub mod events;
pub mod progress;
pub mod queue;
pub mod remote;
pub mod service;

#[cfg(test)]
mod test_helpers;

pub use cache::OfflineBookCache;
pub use config::SyncConfig;
pub use connectivity::Connectivity;
pub use events::{EventBus, Severity, SyncEvent};
pub use progress::ProgressSyncCoordinator;
pub use queue::{OfflineMutationQueue, QueueError, SweepReport};
pub use remote::{HttpRemoteApi, RemoteApi, RemoteError, RemoteResult, UnconfiguredRemote};
pub use service::OfflineServices;
