// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `note` and `highlight` commands.

use std::io::Write;

use kasbook_core::{AnnotationKind, Fields};
use kasbook_sync::OfflineServices;
use serde_json::Value;

use super::{parse_fields, summarize, write_json};
use crate::error::{Error, Result};

/// Save an annotation locally and queue its remote creation.
///
/// While online the queue replays it right away.
pub async fn add(
    services: &OfflineServices,
    kind: AnnotationKind,
    book: &str,
    text: &str,
    extra: &[String],
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::FieldEmpty { field: "text" });
    }
    let mut fields = if extra.is_empty() {
        Fields::new()
    } else {
        parse_fields(extra)?
    };
    fields.insert("bookId".to_string(), Value::String(book.to_string()));
    fields.insert("text".to_string(), Value::String(text.to_string()));

    let annotation = match kind {
        AnnotationKind::Note => services.cache().save_note(book, fields),
        AnnotationKind::Highlight => services.cache().save_highlight(book, fields),
    };
    let item = services
        .queue()
        .add_to_queue(kind.action().as_str(), serde_json::to_value(&annotation)?)
        .await;
    let synced = !services.queue().items().iter().any(|i| i.id == item.id);

    if json {
        return write_json(out, &annotation);
    }
    let status = if synced { "synced" } else { "queued for sync" };
    writeln!(out, "Saved {} {} ({})", kind, annotation.id, status)?;
    Ok(())
}

pub fn list(
    services: &OfflineServices,
    kind: AnnotationKind,
    book: &str,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let annotations = match kind {
        AnnotationKind::Note => services.cache().get_notes(book),
        AnnotationKind::Highlight => services.cache().get_highlights(book),
    };
    if json {
        return write_json(out, &annotations);
    }
    if annotations.is_empty() {
        writeln!(out, "No {}s for {}", kind, book)?;
    }
    for annotation in &annotations {
        let mut fields = annotation.fields.clone();
        let text = fields.remove("text");
        fields.remove("bookId");
        let text = match text {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        write!(
            out,
            "{}  {}  {}",
            annotation.created_at.format("%Y-%m-%d %H:%M"),
            annotation.id,
            text
        )?;
        if !fields.is_empty() {
            write!(out, "  [{}]", summarize(&fields))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "annotation_tests.rs"]
mod tests;
