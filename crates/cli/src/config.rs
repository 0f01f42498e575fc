// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI configuration.
//!
//! Configuration is stored in `kasbook.toml` inside the state directory.
//! Every field has a default, so a missing file or a missing section is
//! equivalent to the defaults below.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kasbook_sync::SyncConfig;
use serde::{Deserialize, Serialize};

use crate::env;
use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "kasbook.toml";
const STATE_DIR_NAME: &str = "kasbook";

/// Contents of `kasbook.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[remote]`: the hosted entity API. Without a URL the CLI runs offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL, e.g. `https://api.kasbook.io/v1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// `[queue]`: offline mutation queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Failed replays before a mutation is dropped (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// `[sync]`: progress coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSection {
    /// Quiet period before a progress update is sent, in milliseconds
    /// (default: 3000).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// `[storage]`: local store files, relative to the state directory unless
/// absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database (default: `kasbook.db`).
    #[serde(default = "default_database")]
    pub database: String,
    /// JSON file used when the database cannot be opened
    /// (default: `kasbook-fallback.json`).
    #[serde(default = "default_fallback_file")]
    pub fallback_file: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    kasbook_sync::config::DEFAULT_MAX_RETRIES
}

fn default_debounce_ms() -> u64 {
    kasbook_sync::config::DEFAULT_DEBOUNCE.as_millis() as u64
}

fn default_database() -> String {
    "kasbook.db".to_string()
}

fn default_fallback_file() -> String {
    "kasbook-fallback.json".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            max_retries: default_max_retries(),
        }
    }
}

impl Default for SyncSection {
    fn default() -> Self {
        SyncSection {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            database: default_database(),
            fallback_file: default_fallback_file(),
        }
    }
}

impl Config {
    /// Loads `kasbook.toml` from `state_dir`, or the defaults if it does
    /// not exist.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let path = state_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes this configuration to `state_dir`, creating the directory.
    pub fn save(&self, state_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(state_dir)?;
        let path = state_dir.join(CONFIG_FILE_NAME);
        fs::write(&path, self.to_toml()?)?;
        Ok(path)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
    }

    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.remote.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "invalid remote url '{}': must start with http:// or https://",
                    url
                )));
            }
        }
        if self.remote.timeout_secs == 0 {
            return Err(Error::Config(
                "remote.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Remote URL, with `KASBOOK_REMOTE_URL` taking precedence.
    pub fn remote_url(&self) -> Option<String> {
        env::remote_url().or_else(|| self.remote.url.clone())
    }

    /// API key, with `KASBOOK_API_KEY` taking precedence.
    pub fn api_key(&self) -> Option<String> {
        env::api_key().or_else(|| self.remote.api_key.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs)
    }

    pub fn database_path(&self, state_dir: &Path) -> PathBuf {
        resolve(state_dir, &self.storage.database)
    }

    pub fn fallback_path(&self, state_dir: &Path) -> PathBuf {
        resolve(state_dir, &self.storage.fallback_file)
    }

    /// Service settings. `online` is the initial connectivity state.
    pub fn sync_config(&self, online: bool) -> SyncConfig {
        SyncConfig {
            debounce: Duration::from_millis(self.sync.debounce_ms),
            max_retries: self.queue.max_retries,
            start_online: online,
            ..SyncConfig::default()
        }
    }
}

fn resolve(state_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        state_dir.join(path)
    }
}

/// Picks the state directory: `--state-dir`, then `KASBOOK_STATE_DIR`,
/// then `$XDG_STATE_HOME/kasbook`, then the platform state directory.
pub fn resolve_state_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join(STATE_DIR_NAME);
    }
    if let Some(dir) = dirs::state_dir() {
        return dir.join(STATE_DIR_NAME);
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state").join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".kasbook"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
