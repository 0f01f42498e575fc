// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::path::Path;

use serde_json::json;

use super::write_json;
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::error::Result;

/// Print the effective configuration and where it lives.
pub fn show(config: &Config, state_dir: &Path, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        return write_json(
            out,
            &json!({
                "stateDir": state_dir,
                "config": config,
            }),
        );
    }
    writeln!(out, "# {}", state_dir.join(CONFIG_FILE_NAME).display())?;
    write!(out, "{}", config.to_toml()?)?;
    Ok(())
}

/// Write the default configuration unless a file already exists.
pub fn init(state_dir: &Path, out: &mut impl Write) -> Result<()> {
    let path = state_dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        writeln!(out, "Config already exists at {}", path.display())?;
        return Ok(());
    }
    let path = Config::default().save(state_dir)?;
    writeln!(out, "Wrote {}", path.display())?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
