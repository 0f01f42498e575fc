// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Records persisted by the offline layer.
//!
//! All records serialize camelCase so that a store written by one client
//! version reads back in another. Caller-supplied fields are kept as an open
//! JSON object and flattened next to the bookkeeping timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::id::generate_id;

/// An open set of caller-defined JSON fields.
pub type Fields = Map<String, Value>;

/// Removes bookkeeping keys a caller may have smuggled into their fields,
/// so flattening never produces duplicate JSON keys.
fn strip_reserved(mut fields: Fields, reserved: &[&str]) -> Fields {
    for key in reserved {
        fields.remove(*key);
    }
    fields
}

/// A cached book: the caller's payload plus cache timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub cached_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    #[serde(flatten)]
    pub data: Fields,
}

impl CacheEntry {
    const RESERVED: &'static [&'static str] = &["cachedAt", "lastAccessed"];

    /// Creates an entry cached and accessed at `now`.
    pub fn new(data: Fields, now: DateTime<Utc>) -> Self {
        CacheEntry {
            cached_at: now,
            last_accessed: now,
            data: strip_reserved(data, Self::RESERVED),
        }
    }

    /// Records a read at `now`. Never moves `last_accessed` backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_accessed {
            self.last_accessed = now;
        }
    }
}

/// Reading progress for one book.
///
/// An absent record reads as [`ProgressRecord::default`]: no fields and no
/// `updatedAt`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl ProgressRecord {
    const RESERVED: &'static [&'static str] = &["updatedAt"];

    /// Shallow-merges `progress` over the existing fields and stamps `updatedAt`.
    pub fn merge(&mut self, progress: Fields, now: DateTime<Utc>) {
        for (key, value) in strip_reserved(progress, Self::RESERVED) {
            self.fields.insert(key, value);
        }
        self.updated_at = Some(now);
    }

    /// Looks up a single progress field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.updated_at.is_none()
    }
}

/// Which per-book annotation list an [`Annotation`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationKind {
    Note,
    Highlight,
}

impl AnnotationKind {
    /// Remote entity name records of this kind are created under.
    pub fn entity(self) -> &'static str {
        match self {
            AnnotationKind::Note => "Note",
            AnnotationKind::Highlight => "Highlight",
        }
    }

    /// Queue action that creates a record of this kind remotely.
    pub fn action(self) -> QueueAction {
        match self {
            AnnotationKind::Note => QueueAction::SaveNote,
            AnnotationKind::Highlight => QueueAction::SaveHighlight,
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationKind::Note => write!(f, "note"),
            AnnotationKind::Highlight => write!(f, "highlight"),
        }
    }
}

/// A note or highlight attached to a book. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Annotation {
    const RESERVED: &'static [&'static str] = &["id", "createdAt"];

    /// Creates an annotation with a freshly generated id.
    pub fn new(fields: Fields, now: DateTime<Utc>) -> Self {
        Annotation {
            id: generate_id(),
            created_at: now,
            fields: strip_reserved(fields, Self::RESERVED),
        }
    }
}

/// The closed set of deferred mutations the queue knows how to replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueueAction {
    UpdateProgress,
    SaveNote,
    SaveHighlight,
    UpdateRecord,
}

impl QueueAction {
    pub fn as_str(self) -> &'static str {
        match self {
            QueueAction::UpdateProgress => "updateProgress",
            QueueAction::SaveNote => "saveNote",
            QueueAction::SaveHighlight => "saveHighlight",
            QueueAction::UpdateRecord => "updateRecord",
        }
    }
}

impl fmt::Display for QueueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "updateProgress" => Ok(QueueAction::UpdateProgress),
            "saveNote" => Ok(QueueAction::SaveNote),
            "saveHighlight" => Ok(QueueAction::SaveHighlight),
            "updateRecord" => Ok(QueueAction::UpdateRecord),
            other => Err(Error::UnknownAction(other.to_string())),
        }
    }
}

/// Payload of an `updateProgress` mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub id: String,
    #[serde(default)]
    pub updates: Fields,
}

/// Payload of an `updateRecord` mutation: update `entity` record `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub entity: String,
    pub id: String,
    pub payload: Value,
}

/// A decoded, typed queue payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    UpdateProgress(ProgressUpdate),
    SaveNote(Fields),
    SaveHighlight(Fields),
    UpdateRecord(RecordUpdate),
}

impl Mutation {
    pub fn action(&self) -> QueueAction {
        match self {
            Mutation::UpdateProgress(_) => QueueAction::UpdateProgress,
            Mutation::SaveNote(_) => QueueAction::SaveNote,
            Mutation::SaveHighlight(_) => QueueAction::SaveHighlight,
            Mutation::UpdateRecord(_) => QueueAction::UpdateRecord,
        }
    }

    /// Serializes the payload into the opaque form stored on a [`QueueItem`].
    pub fn to_data(&self) -> Result<Value> {
        let value = match self {
            Mutation::UpdateProgress(update) => serde_json::to_value(update)?,
            Mutation::SaveNote(fields) | Mutation::SaveHighlight(fields) => {
                Value::Object(fields.clone())
            }
            Mutation::UpdateRecord(update) => serde_json::to_value(update)?,
        };
        Ok(value)
    }

    /// Decodes a queued item. Fails for unknown actions and for payloads
    /// that do not match the action's shape.
    pub fn decode(action: &str, data: &Value) -> Result<Self> {
        let action: QueueAction = action.parse()?;
        let invalid = |e: serde_json::Error| Error::InvalidPayload {
            action: action.to_string(),
            reason: e.to_string(),
        };
        let mutation = match action {
            QueueAction::UpdateProgress => {
                Mutation::UpdateProgress(serde_json::from_value(data.clone()).map_err(invalid)?)
            }
            QueueAction::SaveNote => {
                Mutation::SaveNote(serde_json::from_value(data.clone()).map_err(invalid)?)
            }
            QueueAction::SaveHighlight => {
                Mutation::SaveHighlight(serde_json::from_value(data.clone()).map_err(invalid)?)
            }
            QueueAction::UpdateRecord => {
                Mutation::UpdateRecord(serde_json::from_value(data.clone()).map_err(invalid)?)
            }
        };
        Ok(mutation)
    }
}

/// One deferred mutation waiting for replay.
///
/// `action` stays a string so that an item written by a newer client with an
/// action this build does not know still round-trips through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: String,
    pub action: String,
    pub data: Value,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default)]
    pub retry_count: u32,
}

impl QueueItem {
    pub fn new(action: impl Into<String>, data: Value, now: DateTime<Utc>) -> Self {
        QueueItem {
            id: generate_id(),
            action: action.into(),
            data,
            enqueued_at: now,
            retry_count: 0,
        }
    }

    /// Decodes this item's payload into a typed [`Mutation`].
    pub fn mutation(&self) -> Result<Mutation> {
        Mutation::decode(&self.action, &self.data)
    }
}

/// Approximate footprint of the offline cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub book_count: usize,
    pub total_bytes: u64,
    pub total_mb: f64,
}

impl CacheStats {
    pub fn new(book_count: usize, total_bytes: u64) -> Self {
        // CORRECTNESS: cache sizes are far below f64's exact integer range
        #[allow(clippy::cast_precision_loss)]
        let total_mb = total_bytes as f64 / (1024.0 * 1024.0);
        CacheStats {
            book_count,
            total_bytes,
            total_mb,
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} book(s), {:.2} MB ({} bytes)",
            self.book_count, self.total_mb, self.total_bytes
        )
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
