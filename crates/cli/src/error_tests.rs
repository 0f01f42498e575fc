// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    assignment = { Error::InvalidAssignment("page".into()), "invalid field 'page'" },
    no_fields = { Error::NoFields, "no fields given" },
    empty = { Error::FieldEmpty { field: "note text" }, "note text cannot be empty" },
    not_cached = { Error::BookNotCached("b1".into()), "book not cached: b1" },
    offline = { Error::Offline, "cannot replay the queue while offline" },
)]
fn message_starts_with(err: Error, expected: &str) {
    assert!(
        err.to_string().starts_with(expected),
        "{err} should start with {expected}"
    );
}

#[test]
fn hints_are_on_their_own_line() {
    let msg = Error::InvalidAssignment("x".into()).to_string();
    assert!(msg.contains("\n  hint: "));
}

#[test]
fn remote_errors_pass_through() {
    let err: Error = RemoteError::Offline.into();
    assert_eq!(err.to_string(), "offline");
}

#[test]
fn core_errors_pass_through() {
    let err: Error = kasbook_core::Error::CorruptedData("bad row".into()).into();
    assert!(err.to_string().contains("bad row"));
}
