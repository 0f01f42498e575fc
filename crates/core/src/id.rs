// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use uuid::Uuid;

/// Generate an identifier for a queued mutation, note, or highlight.
///
/// Random (v4) UUIDs: unique across books, queues, and devices, so an id
/// stays valid if the record is later persisted server-side.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
