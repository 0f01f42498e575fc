// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use super::*;
use crate::test_helpers::{manual_clock, memory_store, MockRemote};
use kasbook_core::RecordUpdate;
use serde_json::json;
use tokio::sync::{broadcast, Notify};
use yare::parameterized;

struct Harness {
    queue: Arc<OfflineMutationQueue>,
    remote: Arc<MockRemote>,
    connectivity: Connectivity,
    events: broadcast::Receiver<SyncEvent>,
}

fn harness(online: bool, max_retries: u32) -> Harness {
    let remote = MockRemote::new();
    let connectivity = Connectivity::new(online);
    let bus = EventBus::default();
    let events = bus.subscribe();
    let (_, clock) = manual_clock();
    let queue = Arc::new(OfflineMutationQueue::new(
        memory_store(),
        remote.clone(),
        connectivity.clone(),
        bus,
        clock,
        max_retries,
    ));
    Harness {
        queue,
        remote,
        connectivity,
        events,
    }
}

fn drain(rx: &mut broadcast::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test]
async fn offline_add_persists_without_calling_remote() {
    let mut h = harness(false, 3);

    let item = h
        .queue
        .add_to_queue("saveNote", json!({"bookId": "b1", "text": "hi"}))
        .await;

    assert_eq!(item.retry_count, 0);
    assert_eq!(h.queue.items(), vec![item.clone()]);
    assert_eq!(h.remote.call_count(), 0);
    assert_eq!(
        drain(&mut h.events),
        vec![SyncEvent::MutationQueued {
            id: item.id,
            action: "saveNote".into()
        }]
    );
}

#[tokio::test]
async fn online_add_replays_immediately() {
    let h = harness(true, 3);

    h.queue
        .add_to_queue("saveHighlight", json!({"bookId": "b1", "text": "quote"}))
        .await;

    assert!(h.queue.is_empty());
    let calls = h.remote.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "create");
    assert_eq!(calls[0].entity, "Highlight");
}

#[parameterized(
    progress = {
        "updateProgress",
        json!({"id": "rp-1", "updates": {"page": 12}}),
        "update", "ReadingProgress", Some("rp-1"), json!({"page": 12})
    },
    note = {
        "saveNote",
        json!({"bookId": "b1", "text": "n"}),
        "create", "Note", None, json!({"bookId": "b1", "text": "n"})
    },
    highlight = {
        "saveHighlight",
        json!({"bookId": "b1", "text": "h"}),
        "create", "Highlight", None, json!({"bookId": "b1", "text": "h"})
    },
    record = {
        "updateRecord",
        json!({"entity": "Shelf", "id": "s-9", "payload": {"name": "later"}}),
        "update", "Shelf", Some("s-9"), json!({"name": "later"})
    },
)]
#[test_macro(tokio::test)]
async fn dispatches_by_action(
    action: &str,
    data: Value,
    method: &str,
    entity: &str,
    id: Option<&str>,
    payload: Value,
) {
    let h = harness(false, 3);
    h.queue.add_to_queue(action, data).await;

    let report = h.queue.process_queue().await;

    assert_eq!(report.replayed, 1);
    let calls = h.remote.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, method);
    assert_eq!(calls[0].entity, entity);
    assert_eq!(calls[0].id.as_deref(), id);
    assert_eq!(calls[0].payload, payload);
}

#[tokio::test]
async fn failing_item_is_dropped_after_four_attempts() {
    let mut h = harness(false, 3);
    h.remote.set_fail_all(true);
    h.queue
        .add_to_queue("saveNote", json!({"bookId": "b1", "text": "lost"}))
        .await;

    for attempt in 1..=3u32 {
        let report = h.queue.process_queue().await;
        assert_eq!(report.retried, 1, "sweep {attempt}");
        assert_eq!(h.queue.items()[0].retry_count, attempt);
    }

    let report = h.queue.process_queue().await;
    assert_eq!(report.dropped, 1);
    assert!(h.queue.is_empty());
    assert_eq!(h.remote.call_count(), 4);

    let dropped: Vec<_> = drain(&mut h.events)
        .into_iter()
        .filter(|e| matches!(e, SyncEvent::MutationDropped { .. }))
        .collect();
    assert_eq!(dropped.len(), 1);
    match &dropped[0] {
        SyncEvent::MutationDropped {
            action, attempts, ..
        } => {
            assert_eq!(action, "saveNote");
            assert_eq!(*attempts, 4);
        }
        other => unreachable!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn partial_failure_keeps_only_failed_items_in_order() {
    let h = harness(false, 3);
    h.remote.fail_when(|call| call.entity == "Highlight");

    h.queue
        .add_to_queue("saveNote", json!({"text": "first"}))
        .await;
    let highlight = h
        .queue
        .add_to_queue("saveHighlight", json!({"text": "second"}))
        .await;
    h.queue
        .add_to_queue("updateProgress", json!({"id": "rp-1", "updates": {"page": 2}}))
        .await;

    let report = h.queue.process_queue().await;

    assert_eq!(
        report,
        SweepReport {
            attempted: 3,
            replayed: 2,
            retried: 1,
            dropped: 0,
            skipped: false,
        }
    );
    let left = h.queue.items();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, highlight.id);
    assert_eq!(left[0].retry_count, 1);

    let entities: Vec<_> = h.remote.calls().into_iter().map(|c| c.entity).collect();
    assert_eq!(entities, vec!["Note", "Highlight", "ReadingProgress"]);
}

#[tokio::test]
async fn unknown_action_never_reaches_remote() {
    let mut h = harness(false, 0);
    h.queue.add_to_queue("deleteEverything", json!({})).await;

    let report = h.queue.process_queue().await;

    assert_eq!(report.dropped, 1);
    assert_eq!(h.remote.call_count(), 0);
    assert!(drain(&mut h.events).iter().any(|e| matches!(
        e,
        SyncEvent::MutationDropped { action, .. } if action == "deleteEverything"
    )));
}

#[tokio::test]
async fn malformed_payload_counts_as_failed_attempt() {
    let h = harness(false, 3);
    h.queue
        .add_to_queue("updateProgress", json!({"updates": {"page": 1}}))
        .await;

    let report = h.queue.process_queue().await;

    assert_eq!(report.retried, 1);
    assert_eq!(h.queue.items()[0].retry_count, 1);
    assert_eq!(h.remote.call_count(), 0);
}

#[tokio::test]
async fn enqueue_typed_mutation() {
    let h = harness(false, 3);
    let mutation = Mutation::UpdateRecord(RecordUpdate {
        entity: "ReadingProgress".into(),
        id: "rp-7".into(),
        payload: json!({"page": 40}),
    });

    let item = h.queue.enqueue(&mutation).await.unwrap();

    assert_eq!(item.action, "updateRecord");
    assert_eq!(item.mutation().unwrap(), mutation);
}

#[tokio::test]
async fn clear_discards_everything() {
    let h = harness(false, 3);
    h.queue.add_to_queue("saveNote", json!({"text": "a"})).await;
    h.queue.add_to_queue("saveNote", json!({"text": "b"})).await;

    assert_eq!(h.queue.clear(), 2);
    assert!(h.queue.is_empty());
    assert_eq!(h.queue.process_queue().await, SweepReport::default());
}

/// Remote that parks every call until released.
#[derive(Default)]
struct GatedRemote {
    entered: Notify,
    release: Notify,
}

impl RemoteApi for GatedRemote {
    fn update_record<'a>(
        &'a self,
        _entity: &'a str,
        _id: &'a str,
        _payload: &'a Value,
    ) -> crate::remote::RemoteFuture<'a, Value> {
        Box::pin(async move {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(Value::Null)
        })
    }

    fn create_record<'a>(
        &'a self,
        entity: &'a str,
        payload: &'a Value,
    ) -> crate::remote::RemoteFuture<'a, Value> {
        self.update_record(entity, "", payload)
    }
}

#[tokio::test]
async fn concurrent_sweep_is_skipped_and_late_items_survive() {
    let gate = Arc::new(GatedRemote::default());
    let (_, clock) = manual_clock();
    let queue = Arc::new(OfflineMutationQueue::new(
        memory_store(),
        gate.clone(),
        Connectivity::new(false),
        EventBus::default(),
        clock,
        3,
    ));
    queue.add_to_queue("saveNote", json!({"text": "early"})).await;

    let sweeping = Arc::clone(&queue);
    let first = tokio::spawn(async move { sweeping.process_queue().await });
    gate.entered.notified().await;

    let second = queue.process_queue().await;
    assert!(second.skipped);
    assert_eq!(second.attempted, 0);

    let late = queue.add_to_queue("saveNote", json!({"text": "late"})).await;
    gate.release.notify_one();

    let report = first.await.unwrap();
    assert_eq!(report.replayed, 1);
    let left = queue.items();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, late.id);
    assert_eq!(left[0].retry_count, 0);
}

#[tokio::test]
async fn reconnect_triggers_replay() {
    let h = harness(false, 3);
    h.queue.add_to_queue("saveNote", json!({"text": "queued"})).await;
    let cancel = CancellationToken::new();
    let watcher = h.queue.watch_connectivity(cancel.clone());

    h.connectivity.set_online(true);
    tokio::time::timeout(Duration::from_secs(5), async {
        while !h.queue.is_empty() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    assert_eq!(h.remote.call_count(), 1);
    cancel.cancel();
    watcher.await.unwrap();
}

#[tokio::test]
async fn going_offline_does_not_replay() {
    let h = harness(true, 3);
    h.remote.set_fail_all(true);
    h.queue.add_to_queue("saveNote", json!({"text": "x"})).await;
    assert_eq!(h.remote.call_count(), 1);

    let cancel = CancellationToken::new();
    let watcher = h.queue.watch_connectivity(cancel.clone());
    h.connectivity.set_online(false);
    tokio::task::yield_now().await;

    assert_eq!(h.remote.call_count(), 1);
    assert_eq!(h.queue.len(), 1);
    cancel.cancel();
    watcher.await.unwrap();
}
