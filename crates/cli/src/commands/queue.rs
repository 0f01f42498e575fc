// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use kasbook_sync::OfflineServices;
use serde_json::json;

use super::write_json;
use crate::error::{Error, Result};

pub fn list(services: &OfflineServices, json: bool, out: &mut impl Write) -> Result<()> {
    let items = services.queue().items();
    if json {
        return write_json(out, &items);
    }
    if items.is_empty() {
        writeln!(out, "Queue is empty")?;
        return Ok(());
    }
    for item in &items {
        writeln!(
            out,
            "{}  {:<14} retries={}  queued {}",
            item.id,
            item.action,
            item.retry_count,
            item.enqueued_at.format("%Y-%m-%d %H:%M:%S")
        )?;
    }
    Ok(())
}

/// Replay the queue once. Refuses to run while offline.
pub async fn flush(services: &OfflineServices, json: bool, out: &mut impl Write) -> Result<()> {
    if !services.connectivity().is_online() {
        return Err(Error::Offline);
    }
    let report = services.queue().process_queue().await;
    let remaining = services.queue().len();

    if json {
        return write_json(
            out,
            &json!({
                "attempted": report.attempted,
                "replayed": report.replayed,
                "retried": report.retried,
                "dropped": report.dropped,
                "skipped": report.skipped,
                "remaining": remaining,
            }),
        );
    }
    if report.skipped {
        writeln!(out, "A replay is already in progress")?;
    } else {
        writeln!(
            out,
            "Replayed {}, retrying {}, dropped {} ({} remaining)",
            report.replayed, report.retried, report.dropped, remaining
        )?;
    }
    Ok(())
}

pub fn clear(services: &OfflineServices, json: bool, out: &mut impl Write) -> Result<()> {
    let cleared = services.queue().clear();
    if json {
        return write_json(out, &json!({ "cleared": cleared }));
    }
    writeln!(out, "Cleared {} queued mutation(s)", cleared)?;
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
