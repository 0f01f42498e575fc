// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! kasbook-core: shared data model and local storage for the KASBOOK
//! offline reading layer.
//!
//! This crate provides the persisted record types, the client clock, id
//! generation, and the fail-soft [`KeyValueStore`] that every offline
//! component in `kasbook-sync` is built on.

pub mod clock;
pub mod error;
pub mod id;
pub mod kv;
pub mod model;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use id::generate_id;
pub use kv::{
    BackendOpener, JsonFileBackend, KeyValueStore, KvBackend, MemoryBackend, ServedBy,
    SqliteBackend, StoreEvent, StoreObserver, StoreOp, UnavailableBackend,
};
pub use model::{
    Annotation, AnnotationKind, CacheEntry, CacheStats, Fields, Mutation, ProgressRecord,
    ProgressUpdate, QueueAction, QueueItem, RecordUpdate,
};
