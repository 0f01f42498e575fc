// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn initial_state() {
    assert!(Connectivity::new(true).is_online());
    assert!(!Connectivity::new(false).is_online());
    assert_eq!(Connectivity::default().status_string(), "online");
}

#[test]
fn set_online_reports_transitions_only() {
    let connectivity = Connectivity::new(false);
    assert!(!connectivity.set_online(false));
    assert!(connectivity.set_online(true));
    assert!(!connectivity.set_online(true));
    assert_eq!(connectivity.status_string(), "online");
}

#[test]
fn clones_share_state() {
    let a = Connectivity::new(true);
    let b = a.clone();
    b.set_online(false);
    assert!(!a.is_online());
}

#[tokio::test]
async fn subscribers_wake_on_transition() {
    let connectivity = Connectivity::new(false);
    let mut rx = connectivity.subscribe();

    // Redundant update does not wake.
    connectivity.set_online(false);
    assert!(!rx.has_changed().unwrap());

    connectivity.set_online(true);
    rx.changed().await.unwrap();
    assert!(*rx.borrow_and_update());
}
