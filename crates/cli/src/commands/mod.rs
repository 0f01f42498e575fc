// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod annotation;
pub mod cache;
pub mod config;
pub mod progress;
pub mod queue;
pub mod stats;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::io::Write;

use kasbook_core::Fields;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Parse `key=value` arguments into a JSON object.
///
/// Values that parse as JSON keep their type (`page=3` is a number,
/// `done=true` a bool); anything else is a string.
pub fn parse_fields(args: &[String]) -> Result<Fields> {
    if args.is_empty() {
        return Err(Error::NoFields);
    }
    let mut fields = Fields::new();
    for arg in args {
        let (key, raw) = arg
            .split_once('=')
            .ok_or_else(|| Error::InvalidAssignment(arg.clone()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidAssignment(arg.clone()));
        }
        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// One-line rendering of a field map for text output.
pub fn summarize(fields: &Fields) -> String {
    fields
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => format!("{k}={s}"),
            other => format!("{k}={other}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
