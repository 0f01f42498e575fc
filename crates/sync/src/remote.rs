// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote data API boundary.
//!
//! Provides a trait-based boundary to the hosted entity API so that the
//! queue and the progress coordinator can be tested against an in-process
//! fake, plus an HTTP implementation using reqwest.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;

/// Entity that reading progress records live under.
pub const PROGRESS_ENTITY: &str = "ReadingProgress";

/// Error type for remote API calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The client believes it is offline and did not try.
    #[error("offline")]
    Offline,
}

/// Result type for remote API calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future returned by [`RemoteApi`] methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// The subset of the hosted entity API the offline layer writes through.
pub trait RemoteApi: Send + Sync {
    /// Update record `id` of `entity` with `payload`. Returns the stored record.
    fn update_record<'a>(
        &'a self,
        entity: &'a str,
        id: &'a str,
        payload: &'a Value,
    ) -> RemoteFuture<'a, Value>;

    /// Create a record of `entity`. Returns the stored record.
    fn create_record<'a>(&'a self, entity: &'a str, payload: &'a Value)
        -> RemoteFuture<'a, Value>;
}

/// Entity API over HTTP.
///
/// - update: `PUT {base}/entities/{entity}/{id}`
/// - create: `POST {base}/entities/{entity}`
#[derive(Clone, Debug)]
pub struct HttpRemoteApi {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpRemoteApi {
    /// Create a client for `base_url` whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        let base_url: String = base_url.into();
        tracing::debug!(base_url = %base_url, "creating HttpRemoteApi");
        Ok(HttpRemoteApi {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            client,
        })
    }

    /// Return a client that authenticates with a bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key: String = api_key.into();
        self.api_key = if api_key.is_empty() {
            None
        } else {
            Some(api_key)
        };
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn entity_url(&self, entity: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/entities/{}/{}", self.base_url, entity, id),
            None => format!("{}/entities/{}", self.base_url, entity),
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> RemoteResult<Value> {
        let req = match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        };
        let resp = req
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

impl RemoteApi for HttpRemoteApi {
    fn update_record<'a>(
        &'a self,
        entity: &'a str,
        id: &'a str,
        payload: &'a Value,
    ) -> RemoteFuture<'a, Value> {
        Box::pin(async move {
            let url = self.entity_url(entity, Some(id));
            tracing::debug!(%url, "PUT record");
            self.send(self.client.put(&url).json(payload)).await
        })
    }

    fn create_record<'a>(
        &'a self,
        entity: &'a str,
        payload: &'a Value,
    ) -> RemoteFuture<'a, Value> {
        Box::pin(async move {
            let url = self.entity_url(entity, None);
            tracing::debug!(%url, "POST record");
            self.send(self.client.post(&url).json(payload)).await
        })
    }
}

/// Remote used when no API endpoint is configured. Every call reports
/// [`RemoteError::Offline`], so writes stay queued locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRemote;

impl RemoteApi for UnconfiguredRemote {
    fn update_record<'a>(
        &'a self,
        _entity: &'a str,
        _id: &'a str,
        _payload: &'a Value,
    ) -> RemoteFuture<'a, Value> {
        Box::pin(async { Err(RemoteError::Offline) })
    }

    fn create_record<'a>(
        &'a self,
        _entity: &'a str,
        _payload: &'a Value,
    ) -> RemoteFuture<'a, Value> {
        Box::pin(async { Err(RemoteError::Offline) })
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
