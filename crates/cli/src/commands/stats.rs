// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use kasbook_core::CacheStats;
use kasbook_sync::OfflineServices;
use serde::Serialize;

use super::write_json;
use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    cache: CacheStats,
    queued: usize,
    pending_progress: usize,
    connectivity: &'static str,
    store: String,
    durable: bool,
}

pub fn run(services: &OfflineServices, json: bool, out: &mut impl Write) -> Result<()> {
    let stats = Stats {
        cache: services.cache().get_cache_stats(),
        queued: services.queue().len(),
        pending_progress: services.progress().pending_count(),
        connectivity: services.connectivity().status_string(),
        store: services.store().served_by().to_string(),
        durable: services.store().preferred_available(),
    };

    if json {
        return write_json(out, &stats);
    }
    writeln!(out, "cache:        {}", stats.cache)?;
    writeln!(out, "queued:       {}", stats.queued)?;
    writeln!(out, "progress:     {} pending", stats.pending_progress)?;
    writeln!(out, "connectivity: {}", stats.connectivity)?;
    writeln!(out, "store:        {}", stats.store)?;
    writeln!(out, "durable:      {}", if stats.durable { "yes" } else { "no" })?;
    Ok(())
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
