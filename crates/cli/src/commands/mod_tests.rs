// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for command tests.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use kasbook_core::KeyValueStore;
use kasbook_sync::remote::RemoteFuture;
use kasbook_sync::{OfflineServices, RemoteApi, RemoteError, SyncConfig};
use serde_json::{json, Value};

/// Remote that accepts or rejects every call and counts them.
#[derive(Default)]
pub struct StubRemote {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl StubRemote {
    fn answer(&self) -> Result<Value, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(RemoteError::Status {
                status: 503,
                body: "unavailable".into(),
            })
        } else {
            Ok(json!({}))
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteApi for StubRemote {
    fn update_record<'a>(
        &'a self,
        _entity: &'a str,
        _id: &'a str,
        _payload: &'a Value,
    ) -> RemoteFuture<'a, Value> {
        let answer = self.answer();
        Box::pin(async move { answer })
    }

    fn create_record<'a>(
        &'a self,
        _entity: &'a str,
        _payload: &'a Value,
    ) -> RemoteFuture<'a, Value> {
        let answer = self.answer();
        Box::pin(async move { answer })
    }
}

/// In-memory services with a stub remote.
pub fn services(online: bool) -> (OfflineServices, Arc<StubRemote>) {
    let remote = Arc::new(StubRemote::default());
    let config = SyncConfig {
        start_online: online,
        ..SyncConfig::default()
    };
    let services = OfflineServices::start(config, KeyValueStore::in_memory(), remote.clone());
    (services, remote)
}

/// Captured stdout of a command.
pub fn text(out: &[u8]) -> String {
    String::from_utf8(out.to_vec()).unwrap()
}

/// Captured stdout of a `--json` command.
pub fn json_out(out: &[u8]) -> Value {
    serde_json::from_slice(out).unwrap()
}

#[cfg(test)]
mod tests {
    use super::super::*;
    use serde_json::json;
    use yare::parameterized;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fields_keep_json_types() {
        let fields =
            parse_fields(&args(&["page=3", "done=true", "title=Dune", "ratio=0.5"])).unwrap();
        assert_eq!(fields["page"], json!(3));
        assert_eq!(fields["done"], json!(true));
        assert_eq!(fields["title"], json!("Dune"));
        assert_eq!(fields["ratio"], json!(0.5));
    }

    #[test]
    fn value_may_contain_equals() {
        let fields = parse_fields(&args(&["query=a=b"])).unwrap();
        assert_eq!(fields["query"], json!("a=b"));
    }

    #[parameterized(
        no_equals = { &["page"] },
        empty_key = { &["=3"] },
    )]
    fn bad_assignment(raw: &[&str]) {
        assert!(matches!(
            parse_fields(&args(raw)),
            Err(Error::InvalidAssignment(_))
        ));
    }

    #[test]
    fn empty_args() {
        assert!(matches!(parse_fields(&[]), Err(Error::NoFields)));
    }

    #[test]
    fn summarize_is_ordered() {
        let fields = parse_fields(&args(&["b=2", "a=x"])).unwrap();
        assert_eq!(summarize(&fields), "a=x b=2");
    }
}
