// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle of the offline services.

use std::sync::Arc;

use kasbook_core::{ClockSource, KeyValueStore, SystemClock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::OfflineBookCache;
use crate::config::SyncConfig;
use crate::connectivity::Connectivity;
use crate::events::EventBus;
use crate::progress::ProgressSyncCoordinator;
use crate::queue::OfflineMutationQueue;
use crate::remote::RemoteApi;

/// The cache, queue and progress coordinator wired to one store, one
/// remote API and one connectivity signal.
///
/// Built once at startup with [`OfflineServices::start`] and torn down with
/// [`OfflineServices::shutdown`].
pub struct OfflineServices {
    store: Arc<KeyValueStore>,
    cache: Arc<OfflineBookCache>,
    queue: Arc<OfflineMutationQueue>,
    progress: ProgressSyncCoordinator,
    connectivity: Connectivity,
    events: EventBus,
    cancel: CancellationToken,
    watcher: JoinHandle<()>,
}

impl OfflineServices {
    /// Wire the services and start replaying the queue on reconnect.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(config: SyncConfig, store: KeyValueStore, remote: Arc<dyn RemoteApi>) -> Self {
        Self::start_with_clock(config, store, remote, Arc::new(SystemClock))
    }

    pub fn start_with_clock(
        config: SyncConfig,
        store: KeyValueStore,
        remote: Arc<dyn RemoteApi>,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        let events = EventBus::new(config.event_capacity);
        let store = Arc::new(store.with_observer(Arc::new(events.clone())));
        let connectivity = Connectivity::new(config.start_online);

        let cache = Arc::new(OfflineBookCache::new(store.clone(), clock.clone()));
        let queue = Arc::new(OfflineMutationQueue::new(
            store.clone(),
            remote.clone(),
            connectivity.clone(),
            events.clone(),
            clock.clone(),
            config.max_retries,
        ));
        let progress = ProgressSyncCoordinator::new(
            store.clone(),
            remote,
            queue.clone(),
            connectivity.clone(),
            events.clone(),
            clock,
            config.debounce,
        );

        let cancel = CancellationToken::new();
        let watcher = queue.watch_connectivity(cancel.clone());
        tracing::debug!(
            online = config.start_online,
            debounce_ms = config.debounce.as_millis() as u64,
            max_retries = config.max_retries,
            "offline services started"
        );

        OfflineServices {
            store,
            cache,
            queue,
            progress,
            connectivity,
            events,
            cancel,
            watcher,
        }
    }

    pub fn store(&self) -> &Arc<KeyValueStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<OfflineBookCache> {
        &self.cache
    }

    pub fn queue(&self) -> &Arc<OfflineMutationQueue> {
        &self.queue
    }

    pub fn progress(&self) -> &ProgressSyncCoordinator {
        &self.progress
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Send pending progress syncs, then stop the connectivity watcher.
    pub async fn shutdown(self) {
        let flushed = self.progress.flush().await;
        self.cancel.cancel();
        if let Err(e) = self.watcher.await {
            tracing::warn!(error = %e, "connectivity watcher ended abnormally");
        }
        tracing::debug!(flushed, "offline services stopped");
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
