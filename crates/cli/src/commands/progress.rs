// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use kasbook_sync::OfflineServices;

use super::{parse_fields, summarize, write_json};
use crate::error::{Error, Result};

pub fn show(services: &OfflineServices, record: &str, json: bool, out: &mut impl Write) -> Result<()> {
    let progress = services
        .progress()
        .local_progress(record)
        .ok_or_else(|| Error::NoProgress(record.to_string()))?;
    if json {
        return write_json(out, &progress);
    }
    writeln!(out, "{}: {}", record, summarize(&progress))?;
    Ok(())
}

/// Write progress locally and schedule its sync. The sync is sent when the
/// services shut down, if not earlier.
pub fn set(
    services: &OfflineServices,
    record: &str,
    fields: &[String],
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let progress = parse_fields(fields)?;
    let merged = services.progress().update_progress(record, progress);
    if json {
        return write_json(out, &merged);
    }
    writeln!(out, "Updated {}: {}", record, summarize(&merged))?;
    Ok(())
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
