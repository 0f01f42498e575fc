// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file fallback store.
//!
//! Mirrors a browser's local storage: one flat map of string keys to
//! JSON-encoded string values, kept in a single file. Every write rewrites
//! the whole file through a temporary sibling and fsyncs it before the
//! rename, so a crash leaves either the old or the new map.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::KvBackend;
use crate::error::{Error, Result};

type Entries = BTreeMap<String, String>;

/// Fallback store persisted as one JSON file.
pub struct JsonFileBackend {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileBackend {
    /// Uses `path` as the backing file. The file is created on first write.
    pub fn new(path: &Path) -> Self {
        JsonFileBackend {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn read_entries(&self) -> Result<Entries> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&text).map_err(|e| {
            Error::CorruptedData(format!("{}: {}", self.path.display(), e))
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(serde_json::to_string(entries)?.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KvBackend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "json-file"
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match self.read_entries()?.get(key) {
            Some(text) => Ok(Some(serde_json::from_str(text)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), serde_json::to_string(value)?);
        self.write_entries(&entries)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_entries()?.into_keys().collect())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
