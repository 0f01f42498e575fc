// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use kasbook_core::{ClockSource, KeyValueStore, ManualClock};
use serde_json::{json, Value};

use crate::remote::{RemoteApi, RemoteError, RemoteFuture};

/// Fixed start time for manual clocks: 2026-01-01T00:00:00Z.
pub const T0_MS: i64 = 1_767_225_600_000;

/// One call observed by [`MockRemote`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    pub method: &'static str,
    pub entity: String,
    pub id: Option<String>,
    pub payload: Value,
}

type FailRule = Box<dyn Fn(&RemoteCall) -> bool + Send + Sync>;

/// In-process remote API that records calls and fails on demand.
#[derive(Default)]
pub struct MockRemote {
    calls: Mutex<Vec<RemoteCall>>,
    fail_all: AtomicBool,
    fail_rule: Mutex<Option<FailRule>>,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every call fail (or succeed again).
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Fail only calls matching `rule`.
    pub fn fail_when(&self, rule: impl Fn(&RemoteCall) -> bool + Send + Sync + 'static) {
        *self.fail_rule.lock().unwrap() = Some(Box::new(rule));
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: RemoteCall) -> Result<Value, RemoteError> {
        let fails = self.fail_all.load(Ordering::SeqCst)
            || self
                .fail_rule
                .lock()
                .unwrap()
                .as_ref()
                .is_some_and(|rule| rule(&call));
        let echo = json!({"entity": call.entity, "id": call.id});
        self.calls.lock().unwrap().push(call);
        if fails {
            Err(RemoteError::Status {
                status: 500,
                body: "mock failure".into(),
            })
        } else {
            Ok(echo)
        }
    }
}

impl RemoteApi for MockRemote {
    fn update_record<'a>(
        &'a self,
        entity: &'a str,
        id: &'a str,
        payload: &'a Value,
    ) -> RemoteFuture<'a, Value> {
        let result = self.record(RemoteCall {
            method: "update",
            entity: entity.to_string(),
            id: Some(id.to_string()),
            payload: payload.clone(),
        });
        Box::pin(async move { result })
    }

    fn create_record<'a>(
        &'a self,
        entity: &'a str,
        payload: &'a Value,
    ) -> RemoteFuture<'a, Value> {
        let result = self.record(RemoteCall {
            method: "create",
            entity: entity.to_string(),
            id: None,
            payload: payload.clone(),
        });
        Box::pin(async move { result })
    }
}

/// An in-memory store shared between components under test.
pub fn memory_store() -> Arc<KeyValueStore> {
    Arc::new(KeyValueStore::in_memory())
}

pub fn manual_clock() -> (Arc<ManualClock>, Arc<dyn ClockSource>) {
    let clock = Arc::new(ManualClock::new(T0_MS));
    let shared: Arc<dyn ClockSource> = clock.clone();
    (clock, shared)
}

/// Build a JSON object from a `json!` literal.
pub fn fields(value: Value) -> kasbook_core::Fields {
    match value {
        Value::Object(map) => map,
        other => unreachable!("expected a JSON object, got {other}"),
    }
}
