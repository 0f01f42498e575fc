// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::{json_out, text};
use tempfile::TempDir;

#[test]
fn init_writes_once() {
    let temp = TempDir::new().unwrap();

    let mut out = Vec::new();
    init(temp.path(), &mut out).unwrap();
    assert!(text(&out).starts_with("Wrote "));
    assert_eq!(Config::load(temp.path()).unwrap(), Config::default());

    let mut out = Vec::new();
    init(temp.path(), &mut out).unwrap();
    assert!(text(&out).starts_with("Config already exists"));
}

#[test]
fn show_text_is_toml() {
    let temp = TempDir::new().unwrap();
    let mut out = Vec::new();

    show(&Config::default(), temp.path(), false, &mut out).unwrap();

    let text = text(&out);
    assert!(text.contains("[queue]"));
    assert!(text.contains("max_retries = 3"));
    assert!(text.contains("debounce_ms = 3000"));
}

#[test]
fn show_json() {
    let temp = TempDir::new().unwrap();
    let mut out = Vec::new();

    show(&Config::default(), temp.path(), true, &mut out).unwrap();

    let value = json_out(&out);
    assert_eq!(value["config"]["remote"]["timeout_secs"], json!(30));
    assert!(value["stateDir"].is_string());
}
