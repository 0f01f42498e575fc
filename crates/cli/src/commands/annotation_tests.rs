// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use super::*;
use crate::commands::testing::{json_out, services, text};
use serde_json::json;
use yare::parameterized;

#[parameterized(
    note = { AnnotationKind::Note, "saveNote" },
    highlight = { AnnotationKind::Highlight, "saveHighlight" },
)]
#[test_macro(tokio::test)]
async fn offline_add_is_cached_and_queued(kind: AnnotationKind, action: &str) {
    let (services, remote) = services(false);
    let mut out = Vec::new();

    add(&services, kind, "b1", " a line ", &[], false, &mut out).await.unwrap();

    assert!(text(&out).ends_with("(queued for sync)\n"));
    let items = services.queue().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].action, action);
    assert_eq!(items[0].data["text"], json!("a line"));
    assert_eq!(items[0].data["bookId"], json!("b1"));
    assert_eq!(remote.call_count(), 0);

    let mut out = Vec::new();
    list(&services, kind, "b1", true, &mut out).unwrap();
    let listed = json_out(&out);
    assert_eq!(listed[0]["id"], items[0].data["id"]);
    services.shutdown().await;
}

#[tokio::test]
async fn online_add_syncs_immediately() {
    let (services, remote) = services(true);
    let mut out = Vec::new();

    add(
        &services,
        AnnotationKind::Note,
        "b1",
        "hi",
        &["page=12".to_string()],
        false,
        &mut out,
    )
    .await
    .unwrap();

    assert!(text(&out).ends_with("(synced)\n"));
    assert!(services.queue().is_empty());
    assert_eq!(remote.call_count(), 1);

    let mut out = Vec::new();
    list(&services, AnnotationKind::Note, "b1", false, &mut out).unwrap();
    let listing = text(&out);
    assert!(listing.contains("  hi  [page=12]"), "{listing}");
    services.shutdown().await;
}

#[tokio::test]
async fn failed_sync_stays_queued() {
    let (services, remote) = services(true);
    remote.fail.store(true, Ordering::SeqCst);
    let mut out = Vec::new();

    add(&services, AnnotationKind::Highlight, "b1", "q", &[], false, &mut out)
        .await
        .unwrap();

    assert!(text(&out).ends_with("(queued for sync)\n"));
    assert_eq!(services.queue().items()[0].retry_count, 1);
    services.shutdown().await;
}

#[tokio::test]
async fn blank_text_is_rejected() {
    let (services, _) = services(false);
    let err = add(&services, AnnotationKind::Note, "b1", "   ", &[], false, &mut Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::FieldEmpty { .. }));
    services.shutdown().await;
}

#[tokio::test]
async fn empty_list() {
    let (services, _) = services(false);
    let mut out = Vec::new();
    list(&services, AnnotationKind::Highlight, "b9", false, &mut out).unwrap();
    assert_eq!(text(&out), "No highlights for b9\n");
    services.shutdown().await;
}
