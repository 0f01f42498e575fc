// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use kasbook_sync::OfflineServices;
use serde_json::json;

use super::{parse_fields, summarize, write_json};
use crate::error::{Error, Result};

pub fn list(services: &OfflineServices, json: bool, out: &mut impl Write) -> Result<()> {
    let ids = services.cache().cached_book_ids();
    if json {
        return write_json(out, &ids);
    }
    if ids.is_empty() {
        writeln!(out, "No books cached")?;
    }
    for id in ids {
        writeln!(out, "{}", id)?;
    }
    Ok(())
}

/// Print a cached book. Counts as a read.
pub fn show(services: &OfflineServices, book: &str, json: bool, out: &mut impl Write) -> Result<()> {
    let entry = services
        .cache()
        .get_cached_book(book)
        .ok_or_else(|| Error::BookNotCached(book.to_string()))?;
    if json {
        return write_json(out, &entry);
    }
    writeln!(out, "{}", book)?;
    writeln!(out, "  cached:    {}", entry.cached_at.to_rfc3339())?;
    writeln!(out, "  last read: {}", entry.last_accessed.to_rfc3339())?;
    if !entry.data.is_empty() {
        writeln!(out, "  {}", summarize(&entry.data))?;
    }
    Ok(())
}

pub fn put(
    services: &OfflineServices,
    book: &str,
    fields: &[String],
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let data = parse_fields(fields)?;
    let entry = services.cache().cache_book(book, data);
    if json {
        return write_json(out, &entry);
    }
    writeln!(out, "Cached {}", book)?;
    Ok(())
}

pub fn remove(services: &OfflineServices, book: &str, json: bool, out: &mut impl Write) -> Result<()> {
    if !services.cache().remove_book(book) {
        return Err(Error::BookNotCached(book.to_string()));
    }
    if json {
        return write_json(out, &json!({ "removed": book }));
    }
    writeln!(out, "Removed {}", book)?;
    Ok(())
}

pub fn clear(services: &OfflineServices, json: bool, out: &mut impl Write) -> Result<()> {
    let before = services.cache().get_cache_stats();
    services.cache().clear_cache();
    if json {
        return write_json(out, &json!({ "cleared": before.book_count }));
    }
    writeln!(out, "Cleared offline cache ({})", before)?;
    Ok(())
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
