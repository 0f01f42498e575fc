// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn missing_file_gives_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::load(temp.path()).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.remote.timeout_secs, 30);
    assert_eq!(config.queue.max_retries, 3);
    assert_eq!(config.sync.debounce_ms, 3000);
    assert_eq!(config.storage.database, "kasbook.db");
}

#[test]
fn partial_file_keeps_other_defaults() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(CONFIG_FILE_NAME),
        "[remote]\nurl = \"https://api.kasbook.io\"\n\n[queue]\nmax_retries = 5\n",
    )
    .unwrap();

    let config = Config::load(temp.path()).unwrap();

    assert_eq!(config.remote.url.as_deref(), Some("https://api.kasbook.io"));
    assert_eq!(config.remote.timeout_secs, 30);
    assert_eq!(config.queue.max_retries, 5);
    assert_eq!(config.sync.debounce_ms, 3000);
}

#[test]
fn save_then_load() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("nested");
    let mut config = Config::default();
    config.sync.debounce_ms = 500;
    config.remote.api_key = Some("k".into());

    let path = config.save(&dir).unwrap();

    assert!(path.ends_with(CONFIG_FILE_NAME));
    assert_eq!(Config::load(&dir).unwrap(), config);
}

#[parameterized(
    bad_scheme = { "[remote]\nurl = \"ftp://x\"\n", "invalid remote url" },
    zero_timeout = { "[remote]\ntimeout_secs = 0\n", "timeout_secs" },
    bad_toml = { "[remote\n", "failed to parse config" },
    wrong_type = { "[queue]\nmax_retries = \"many\"\n", "failed to parse config" },
)]
fn invalid_config_is_rejected(content: &str, expected: &str) {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CONFIG_FILE_NAME), content).unwrap();

    let err = Config::load(temp.path()).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains(expected), "{err}");
}

#[test]
fn storage_paths_resolve_against_state_dir() {
    let mut config = Config::default();
    let state = Path::new("/var/kasbook");
    assert_eq!(
        config.database_path(state),
        PathBuf::from("/var/kasbook/kasbook.db")
    );

    config.storage.fallback_file = "/tmp/fallback.json".into();
    assert_eq!(
        config.fallback_path(state),
        PathBuf::from("/tmp/fallback.json")
    );
}

#[test]
fn sync_config_mapping() {
    let mut config = Config::default();
    config.sync.debounce_ms = 250;
    config.queue.max_retries = 1;

    let sync = config.sync_config(false);

    assert_eq!(sync.debounce, Duration::from_millis(250));
    assert_eq!(sync.max_retries, 1);
    assert!(!sync.start_online);
}

#[test]
fn state_dir_flag_wins() {
    let dir = resolve_state_dir(Some(Path::new("/explicit")));
    assert_eq!(dir, PathBuf::from("/explicit"));
}

#[test]
fn state_dir_from_env() {
    std::env::set_var("KASBOOK_STATE_DIR", "/tmp/kasbook-env");
    let dir = resolve_state_dir(None);
    std::env::remove_var("KASBOOK_STATE_DIR");
    assert_eq!(dir, PathBuf::from("/tmp/kasbook-env"));
}
