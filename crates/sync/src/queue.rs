// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline mutation queue.
//!
//! Writes that could not be confirmed by the remote API are persisted as
//! [`QueueItem`]s in a single store entry and replayed in enqueue order when
//! connectivity returns.
//!
//! Per item: `Pending → replayed (removed)`, or
//! `Pending → Retrying(n) → Dropped (removed, reported)` once `n` exceeds
//! the retry budget. Delivery is best effort, not at-least-once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use kasbook_core::{ClockSource, KeyValueStore, Mutation, QueueItem};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::connectivity::Connectivity;
use crate::events::{EventBus, SyncEvent};
use crate::remote::{RemoteApi, RemoteError, PROGRESS_ENTITY};

/// Store key holding the whole queue.
pub const QUEUE_KEY: &str = "offline_queue";

/// Why replaying one item failed.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Unknown action or a payload that does not fit the action.
    #[error(transparent)]
    Mutation(#[from] kasbook_core::Error),

    /// The remote API rejected or never received the write.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Outcome counts of one [`OfflineMutationQueue::process_queue`] sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub attempted: usize,
    pub replayed: usize,
    pub retried: usize,
    pub dropped: usize,
    /// True if another sweep was already running and this call did nothing.
    pub skipped: bool,
}

enum Outcome {
    Remove,
    Retry(u32),
}

/// Persisted queue of deferred mutations.
pub struct OfflineMutationQueue {
    store: Arc<KeyValueStore>,
    remote: Arc<dyn RemoteApi>,
    connectivity: Connectivity,
    events: EventBus,
    clock: Arc<dyn ClockSource>,
    max_retries: u32,
    /// Held for the duration of a sweep; sweeps never overlap.
    sweep: tokio::sync::Mutex<()>,
    /// Serializes read-modify-write cycles on the persisted queue.
    write_lock: Mutex<()>,
}

impl OfflineMutationQueue {
    pub fn new(
        store: Arc<KeyValueStore>,
        remote: Arc<dyn RemoteApi>,
        connectivity: Connectivity,
        events: EventBus,
        clock: Arc<dyn ClockSource>,
        max_retries: u32,
    ) -> Self {
        OfflineMutationQueue {
            store,
            remote,
            connectivity,
            events,
            clock,
            max_retries,
            sweep: tokio::sync::Mutex::new(()),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Vec<QueueItem> {
        self.store.get_as(QUEUE_KEY).unwrap_or_default()
    }

    fn save(&self, items: &[QueueItem]) {
        if items.is_empty() {
            self.store.delete(QUEUE_KEY);
        } else {
            self.store.set_as(QUEUE_KEY, &items);
        }
    }

    /// Queued items in replay order.
    pub fn items(&self) -> Vec<QueueItem> {
        self.load()
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard every queued item without replaying it.
    pub fn clear(&self) -> usize {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let count = self.load().len();
        self.save(&[]);
        count
    }

    fn append(&self, item: QueueItem) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut items = self.load();
        items.push(item);
        self.save(&items);
    }

    /// Persist a deferred mutation. Replays immediately if online.
    pub async fn add_to_queue(&self, action: impl Into<String>, data: Value) -> QueueItem {
        let item = QueueItem::new(action, data, self.clock.now());
        self.append(item.clone());
        self.events.emit(SyncEvent::MutationQueued {
            id: item.id.clone(),
            action: item.action.clone(),
        });

        if self.connectivity.is_online() {
            self.process_queue().await;
        }
        item
    }

    /// Typed form of [`Self::add_to_queue`].
    pub async fn enqueue(&self, mutation: &Mutation) -> QueueResult<QueueItem> {
        let data = mutation.to_data()?;
        Ok(self.add_to_queue(mutation.action().as_str(), data).await)
    }

    /// Replay every queued item once, in enqueue order.
    ///
    /// Items added while the sweep runs are kept and picked up by the next
    /// sweep. A call made while another sweep is running returns at once
    /// with [`SweepReport::skipped`] set.
    pub async fn process_queue(&self) -> SweepReport {
        let Ok(_sweep) = self.sweep.try_lock() else {
            tracing::debug!("queue sweep already running");
            return SweepReport {
                skipped: true,
                ..SweepReport::default()
            };
        };

        let snapshot = self.load();
        if snapshot.is_empty() {
            return SweepReport::default();
        }
        tracing::info!(items = snapshot.len(), "replaying offline queue");

        let mut report = SweepReport::default();
        let mut outcomes: HashMap<String, Outcome> = HashMap::new();

        for item in &snapshot {
            report.attempted += 1;
            match self.process_item(item).await {
                Ok(()) => {
                    report.replayed += 1;
                    outcomes.insert(item.id.clone(), Outcome::Remove);
                    self.events.emit(SyncEvent::MutationReplayed {
                        id: item.id.clone(),
                        action: item.action.clone(),
                    });
                }
                Err(e) => {
                    let attempts = item.retry_count.saturating_add(1);
                    if attempts > self.max_retries {
                        report.dropped += 1;
                        outcomes.insert(item.id.clone(), Outcome::Remove);
                        self.events.emit(SyncEvent::MutationDropped {
                            id: item.id.clone(),
                            action: item.action.clone(),
                            attempts,
                            error: e.to_string(),
                        });
                    } else {
                        report.retried += 1;
                        outcomes.insert(item.id.clone(), Outcome::Retry(attempts));
                        self.events.emit(SyncEvent::MutationRetrying {
                            id: item.id.clone(),
                            action: item.action.clone(),
                            attempts,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        // Apply outcomes to the live queue, which may have grown meanwhile.
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut live = self.load();
        live.retain_mut(|item| match outcomes.get(&item.id) {
            Some(Outcome::Remove) => false,
            Some(Outcome::Retry(attempts)) => {
                item.retry_count = item.retry_count.max(*attempts);
                true
            }
            None => true,
        });
        self.save(&live);

        tracing::info!(
            replayed = report.replayed,
            retried = report.retried,
            dropped = report.dropped,
            remaining = live.len(),
            "offline queue sweep finished"
        );
        report
    }

    /// Issue the remote write a queued item describes.
    pub async fn process_item(&self, item: &QueueItem) -> QueueResult<()> {
        match item.mutation()? {
            Mutation::UpdateProgress(update) => {
                let payload = Value::Object(update.updates);
                self.remote
                    .update_record(PROGRESS_ENTITY, &update.id, &payload)
                    .await?;
            }
            Mutation::SaveNote(note) => {
                self.remote
                    .create_record("Note", &Value::Object(note))
                    .await?;
            }
            Mutation::SaveHighlight(highlight) => {
                self.remote
                    .create_record("Highlight", &Value::Object(highlight))
                    .await?;
            }
            Mutation::UpdateRecord(update) => {
                self.remote
                    .update_record(&update.entity, &update.id, &update.payload)
                    .await?;
            }
        }
        Ok(())
    }

    /// Replay the queue on every offline→online transition until `cancel`
    /// fires.
    pub fn watch_connectivity(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let queue = Arc::clone(self);
        let mut rx = self.connectivity.subscribe();

        tokio::spawn(async move {
            let mut was_online = *rx.borrow_and_update();
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let online = *rx.borrow_and_update();
                        if online && !was_online {
                            tracing::info!("connectivity restored");
                            queue.process_queue().await;
                        }
                        was_online = online;
                    }
                }
            }
            tracing::debug!("connectivity watcher stopped");
        })
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
