// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Debounced reading-progress sync.
//!
//! Every update lands in the local store at once. The remote write is held
//! back until a record has been quiet for the debounce window, so a burst of
//! page turns costs one request carrying the last payload of the burst.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kasbook_core::{ClockSource, Fields, KeyValueStore, Mutation, RecordUpdate};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::connectivity::Connectivity;
use crate::events::{EventBus, SyncEvent};
use crate::queue::OfflineMutationQueue;
use crate::remote::{RemoteApi, RemoteError, PROGRESS_ENTITY};

/// Prefix of the store key holding one record's local progress.
pub const LOCAL_KEY_PREFIX: &str = "reading_progress_";

/// Field stamped on every local progress write.
pub const LAST_READ_FIELD: &str = "lastReadAt";

pub fn local_key(record_id: &str) -> String {
    format!("{LOCAL_KEY_PREFIX}{record_id}")
}

struct PendingSync {
    generation: u64,
    payload: Fields,
    handle: JoinHandle<()>,
}

struct Inner {
    store: Arc<KeyValueStore>,
    remote: Arc<dyn RemoteApi>,
    queue: Arc<OfflineMutationQueue>,
    connectivity: Connectivity,
    events: EventBus,
    clock: Arc<dyn ClockSource>,
    debounce: Duration,
    pending: Mutex<HashMap<String, PendingSync>>,
    generation: AtomicU64,
    local_lock: Mutex<()>,
}

/// Coalesces progress updates per record and syncs them after a quiet
/// period, deferring failed writes to the offline queue.
#[derive(Clone)]
pub struct ProgressSyncCoordinator {
    inner: Arc<Inner>,
}

impl ProgressSyncCoordinator {
    pub fn new(
        store: Arc<KeyValueStore>,
        remote: Arc<dyn RemoteApi>,
        queue: Arc<OfflineMutationQueue>,
        connectivity: Connectivity,
        events: EventBus,
        clock: Arc<dyn ClockSource>,
        debounce: Duration,
    ) -> Self {
        ProgressSyncCoordinator {
            inner: Arc::new(Inner {
                store,
                remote,
                queue,
                connectivity,
                events,
                clock,
                debounce,
                pending: Mutex::new(HashMap::new()),
                generation: AtomicU64::new(0),
                local_lock: Mutex::new(()),
            }),
        }
    }

    /// Apply `progress` locally and schedule a debounced remote sync.
    ///
    /// Returns the merged local record. Must be called within a tokio
    /// runtime.
    pub fn update_progress(&self, record_id: &str, progress: Fields) -> Fields {
        let merged = self.inner.write_local(record_id, &progress);
        self.schedule(record_id, progress);
        merged
    }

    fn schedule(&self, record_id: &str, payload: Fields) {
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
        let mut pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(previous) = pending.remove(record_id) {
            previous.handle.abort();
            tracing::trace!(record_id, "superseded pending progress sync");
        }

        let inner = Arc::clone(&self.inner);
        let id = record_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            let payload = {
                let mut pending = inner.pending.lock().unwrap_or_else(|e| e.into_inner());
                let current = pending
                    .get(&id)
                    .is_some_and(|entry| entry.generation == generation);
                if current {
                    pending.remove(&id).map(|entry| entry.payload)
                } else {
                    None
                }
            };
            if let Some(payload) = payload {
                inner.sync_progress(&id, payload).await;
            }
        });

        pending.insert(
            record_id.to_string(),
            PendingSync {
                generation,
                payload,
                handle,
            },
        );
    }

    /// Write `payload` to the remote API now, queueing it on failure.
    pub async fn sync_progress(&self, record_id: &str, payload: Fields) {
        self.inner.sync_progress(record_id, payload).await;
    }

    /// Send every pending sync immediately. Returns how many were sent.
    pub async fn flush(&self) -> usize {
        let drained: Vec<(String, Fields)> = {
            let mut pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending
                .drain()
                .map(|(id, entry)| {
                    entry.handle.abort();
                    (id, entry.payload)
                })
                .collect()
        };

        let count = drained.len();
        if count > 0 {
            tracing::debug!(count, "flushing pending progress syncs");
        }
        for (id, payload) in drained {
            self.inner.sync_progress(&id, payload).await;
        }
        count
    }

    /// Records with a sync still waiting out the debounce window.
    pub fn pending_count(&self) -> usize {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// The locally stored progress for `record_id`.
    pub fn local_progress(&self, record_id: &str) -> Option<Fields> {
        self.inner.store.get_as(&local_key(record_id))
    }
}

impl Inner {
    fn write_local(&self, record_id: &str, progress: &Fields) -> Fields {
        let _guard = self.local_lock.lock().unwrap_or_else(|e| e.into_inner());
        let key = local_key(record_id);
        let mut record: Fields = self.store.get_as(&key).unwrap_or_default();
        for (k, v) in progress {
            record.insert(k.clone(), v.clone());
        }
        record.insert(
            LAST_READ_FIELD.to_string(),
            Value::String(self.clock.now().to_rfc3339()),
        );
        self.store.set_as(&key, &record);
        record
    }

    async fn sync_progress(&self, record_id: &str, payload: Fields) {
        let body = Value::Object(payload);
        let result = if self.connectivity.is_online() {
            self.remote
                .update_record(PROGRESS_ENTITY, record_id, &body)
                .await
        } else {
            Err(RemoteError::Offline)
        };

        match result {
            Ok(_) => self.events.emit(SyncEvent::ProgressSynced {
                record_id: record_id.to_string(),
            }),
            Err(e) => {
                self.events.emit(SyncEvent::ProgressDeferred {
                    record_id: record_id.to_string(),
                    error: e.to_string(),
                });
                let mutation = Mutation::UpdateRecord(RecordUpdate {
                    entity: PROGRESS_ENTITY.to_string(),
                    id: record_id.to_string(),
                    payload: body,
                });
                if let Err(e) = self.queue.enqueue(&mutation).await {
                    tracing::error!(record_id, error = %e, "failed to queue progress update");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
