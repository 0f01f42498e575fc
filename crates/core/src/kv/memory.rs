// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::KvBackend;
use crate::error::{Error, Result};

/// Process-local backend.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.keys().cloned().collect())
    }
}

/// A backend that rejects every operation, standing in for a disabled or
/// unsupported store.
#[derive(Debug, Clone)]
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        UnavailableBackend {
            reason: reason.into(),
        }
    }

    fn error(&self) -> Error {
        Error::BackendUnavailable {
            backend: "unavailable",
            reason: self.reason.clone(),
        }
    }
}

impl KvBackend for UnavailableBackend {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn get(&self, _key: &str) -> Result<Option<Value>> {
        Err(self.error())
    }

    fn set(&self, _key: &str, _value: &Value) -> Result<()> {
        Err(self.error())
    }

    fn delete(&self, _key: &str) -> Result<()> {
        Err(self.error())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Err(self.error())
    }
}
