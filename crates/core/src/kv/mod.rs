// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fail-soft local key-value storage.
//!
//! ```text
//! ┌──────────────┐   first    ┌──────────────────┐
//! │ KeyValueStore│──────────►│ preferred backend│  (SQLite, opened once)
//! │  (fail-soft) │           └──────────────────┘
//! │              │  on error  ┌──────────────────┐
//! │              │──────────►│ fallback backend │  (JSON file / memory)
//! └──────────────┘           └──────────────────┘
//!        │ failures
//!        ▼
//!  StoreObserver + tracing
//! ```
//!
//! The store is a cache, not a system of record: no operation returns an
//! error. Failures are logged and handed to an optional [`StoreObserver`].
//!
//! A write that lands in the fallback is the newest copy of its key. Reads
//! consult the fallback first while it holds anything, and when the
//! preferred backend opens, entries left in the fallback by an earlier
//! session are moved into it.

mod file;
mod memory;
mod sqlite;

pub use file::JsonFileBackend;
pub use memory::{MemoryBackend, UnavailableBackend};
pub use sqlite::SqliteBackend;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use crate::error::Result;

/// A fallible storage backend.
pub trait KvBackend: Send + Sync {
    /// Short backend name used in logs and events.
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, key: &str, value: &Value) -> Result<()>;

    fn delete(&self, key: &str) -> Result<()>;

    /// Every stored key, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Opens the preferred backend. Called at most once per store.
pub type BackendOpener = Box<dyn Fn() -> Result<Box<dyn KvBackend>> + Send + Sync>;

/// Which operation a [`StoreEvent`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Open,
    Get,
    Set,
    Delete,
    Decode,
    Encode,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StoreOp::Open => "open",
            StoreOp::Get => "get",
            StoreOp::Set => "set",
            StoreOp::Delete => "delete",
            StoreOp::Decode => "decode",
            StoreOp::Encode => "encode",
        };
        f.write_str(s)
    }
}

/// A storage failure that was absorbed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub backend: &'static str,
    pub op: StoreOp,
    pub key: String,
    pub error: String,
    /// True when the failure lost data or a read: the fallback failed too.
    pub unrecovered: bool,
}

/// Receives storage failures so that silent data loss is observable.
pub trait StoreObserver: Send + Sync {
    fn on_store_event(&self, event: &StoreEvent);
}

/// Which backend served the most recent operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedBy {
    None,
    Preferred,
    Fallback,
}

impl fmt::Display for ServedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServedBy::None => write!(f, "none"),
            ServedBy::Preferred => write!(f, "preferred"),
            ServedBy::Fallback => write!(f, "fallback"),
        }
    }
}

const SERVED_NONE: u8 = 0;
const SERVED_PREFERRED: u8 = 1;
const SERVED_FALLBACK: u8 = 2;

/// The fail-soft key-value store used by every offline component.
pub struct KeyValueStore {
    open_preferred: BackendOpener,
    preferred: OnceLock<Option<Box<dyn KvBackend>>>,
    fallback: Box<dyn KvBackend>,
    observer: Option<Arc<dyn StoreObserver>>,
    /// Set while the fallback may hold keys newer than the preferred copy.
    fallback_used: AtomicBool,
    served: AtomicU8,
}

impl KeyValueStore {
    /// Create a store that lazily opens its preferred backend with `opener`
    /// and falls back to `fallback`.
    pub fn new(opener: BackendOpener, fallback: Box<dyn KvBackend>) -> Self {
        KeyValueStore {
            open_preferred: opener,
            preferred: OnceLock::new(),
            fallback,
            observer: None,
            fallback_used: AtomicBool::new(false),
            served: AtomicU8::new(SERVED_NONE),
        }
    }

    /// SQLite at `db_path`, falling back to a JSON file at `fallback_path`.
    pub fn open(db_path: &Path, fallback_path: &Path) -> Self {
        let db_path: PathBuf = db_path.to_path_buf();
        let opener: BackendOpener = Box::new(move || {
            let backend: Box<dyn KvBackend> = Box::new(SqliteBackend::open(&db_path)?);
            Ok(backend)
        });
        Self::new(opener, Box::new(JsonFileBackend::new(fallback_path)))
    }

    /// Process-local store. Nothing survives the process.
    pub fn in_memory() -> Self {
        let opener: BackendOpener = Box::new(|| {
            let backend: Box<dyn KvBackend> = Box::new(MemoryBackend::new());
            Ok(backend)
        });
        Self::new(opener, Box::new(MemoryBackend::new()))
    }

    /// Attach an observer for absorbed failures.
    pub fn with_observer(mut self, observer: Arc<dyn StoreObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Which backend served the most recent successful operation.
    pub fn served_by(&self) -> ServedBy {
        match self.served.load(Ordering::Acquire) {
            SERVED_PREFERRED => ServedBy::Preferred,
            SERVED_FALLBACK => ServedBy::Fallback,
            _ => ServedBy::None,
        }
    }

    /// Returns true if the preferred backend opened successfully.
    pub fn preferred_available(&self) -> bool {
        self.preferred().is_some()
    }

    fn preferred(&self) -> Option<&dyn KvBackend> {
        self.preferred
            .get_or_init(|| match (self.open_preferred)() {
                Ok(backend) => {
                    tracing::debug!(backend = backend.name(), "opened preferred store");
                    self.migrate_fallback(backend.as_ref());
                    Some(backend)
                }
                Err(e) => {
                    self.report("preferred", StoreOp::Open, "", &e.to_string(), false);
                    None
                }
            })
            .as_deref()
    }

    /// Move entries written to the fallback by an earlier session into the
    /// freshly opened preferred backend. Anything that cannot be moved stays
    /// where it is and keeps winning reads.
    fn migrate_fallback(&self, preferred: &dyn KvBackend) {
        let keys = match self.fallback.keys() {
            Ok(keys) => keys,
            Err(e) => {
                self.report(self.fallback.name(), StoreOp::Get, "", &e.to_string(), false);
                self.fallback_used.store(true, Ordering::Release);
                return;
            }
        };
        let mut moved = 0usize;
        for key in &keys {
            let result = self.fallback.get(key).and_then(|value| match value {
                Some(value) => preferred.set(key, &value),
                None => Ok(()),
            });
            match result.and_then(|()| self.fallback.delete(key)) {
                Ok(()) => moved += 1,
                Err(e) => {
                    self.report(preferred.name(), StoreOp::Set, key, &e.to_string(), false);
                    self.fallback_used.store(true, Ordering::Release);
                }
            }
        }
        if moved > 0 {
            tracing::info!(moved, "restored entries from fallback store");
        }
    }

    fn report(&self, backend: &'static str, op: StoreOp, key: &str, error: &str, unrecovered: bool) {
        if unrecovered {
            tracing::warn!(backend, %op, key, error, "storage operation failed");
        } else {
            tracing::debug!(backend, %op, key, error, "storage operation fell back");
        }
        if let Some(observer) = &self.observer {
            observer.on_store_event(&StoreEvent {
                backend,
                op,
                key: key.to_string(),
                error: error.to_string(),
                unrecovered,
            });
        }
    }

    fn mark(&self, served: u8) {
        self.served.store(served, Ordering::Release);
    }

    /// Read a raw JSON value.
    pub fn get(&self, key: &str) -> Option<Value> {
        let Some(preferred) = self.preferred() else {
            return self.fallback_get(key);
        };
        if self.fallback_used.load(Ordering::Acquire) {
            match self.fallback.get(key) {
                Ok(Some(value)) => {
                    self.mark(SERVED_FALLBACK);
                    return Some(value);
                }
                Ok(None) => {}
                Err(e) => {
                    self.report(self.fallback.name(), StoreOp::Get, key, &e.to_string(), false)
                }
            }
        }
        match preferred.get(key) {
            Ok(value) => {
                self.mark(SERVED_PREFERRED);
                value
            }
            Err(e) => {
                self.report(preferred.name(), StoreOp::Get, key, &e.to_string(), false);
                self.fallback_get(key)
            }
        }
    }

    fn fallback_get(&self, key: &str) -> Option<Value> {
        match self.fallback.get(key) {
            Ok(value) => {
                self.mark(SERVED_FALLBACK);
                value
            }
            Err(e) => {
                self.report(self.fallback.name(), StoreOp::Get, key, &e.to_string(), true);
                None
            }
        }
    }

    /// Write a raw JSON value.
    pub fn set(&self, key: &str, value: &Value) {
        let preferred = self.preferred();
        if let Some(preferred) = preferred {
            match preferred.set(key, value) {
                Ok(()) => {
                    self.mark(SERVED_PREFERRED);
                    if self.fallback_used.load(Ordering::Acquire) {
                        if let Err(e) = self.fallback.delete(key) {
                            self.report(
                                self.fallback.name(),
                                StoreOp::Delete,
                                key,
                                &e.to_string(),
                                false,
                            );
                        }
                    }
                    return;
                }
                Err(e) => self.report(preferred.name(), StoreOp::Set, key, &e.to_string(), false),
            }
        }

        match self.fallback.set(key, value) {
            Ok(()) => {
                self.fallback_used.store(true, Ordering::Release);
                self.mark(SERVED_FALLBACK);
            }
            Err(e) => {
                self.report(self.fallback.name(), StoreOp::Set, key, &e.to_string(), true);
                return;
            }
        }
        // The preferred copy is now stale.
        if let Some(preferred) = preferred {
            if let Err(e) = preferred.delete(key) {
                self.report(preferred.name(), StoreOp::Delete, key, &e.to_string(), false);
            }
        }
    }

    /// Remove a key from every backend that may hold it.
    pub fn delete(&self, key: &str) {
        let mut deleted = false;
        if let Some(preferred) = self.preferred() {
            match preferred.delete(key) {
                Ok(()) => {
                    self.mark(SERVED_PREFERRED);
                    deleted = true;
                }
                Err(e) => {
                    self.report(preferred.name(), StoreOp::Delete, key, &e.to_string(), false)
                }
            }
        }

        if deleted && !self.fallback_used.load(Ordering::Acquire) {
            return;
        }
        match self.fallback.delete(key) {
            Ok(()) => {
                if !deleted {
                    self.mark(SERVED_FALLBACK);
                }
            }
            Err(e) => self.report(
                self.fallback.name(),
                StoreOp::Delete,
                key,
                &e.to_string(),
                !deleted,
            ),
        }
    }

    /// Read and decode a typed value. Undecodable data reads as absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                self.report("store", StoreOp::Decode, key, &e.to_string(), true);
                None
            }
        }
    }

    /// Encode and write a typed value.
    pub fn set_as<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.set(key, &value),
            Err(e) => self.report("store", StoreOp::Encode, key, &e.to_string(), true),
        }
    }
}

impl fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("fallback", &self.fallback.name())
            .field("served_by", &self.served_by())
            .finish()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
