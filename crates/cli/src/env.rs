// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variables read by the CLI.
//!
//! Name constants are generated by `build.rs` into [`vars`].

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the value of `KASBOOK_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    non_empty(vars::KASBOOK_STATE_DIR).map(PathBuf::from)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    non_empty(vars::XDG_STATE_HOME).map(PathBuf::from)
}

/// API key override; wins over `[remote] api_key`.
pub fn api_key() -> Option<String> {
    non_empty(vars::KASBOOK_API_KEY)
}

/// Remote URL override; wins over `[remote] url`.
pub fn remote_url() -> Option<String> {
    non_empty(vars::KASBOOK_REMOTE_URL)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
