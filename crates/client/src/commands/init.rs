// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};

pub fn run(path: &Path, base_url: Option<String>, force: bool) -> Result<()> {
    let config = run_impl(path, base_url, force)?;
    println!("Wrote {}", path.display());
    println!("base_url: {}", config.base_url);
    Ok(())
}

/// Writes a default configuration, optionally pointing at `base_url`.
pub(crate) fn run_impl(path: &Path, base_url: Option<String>, force: bool) -> Result<Config> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists\n  hint: pass --force to overwrite it",
            path.display()
        )));
    }

    let mut config = Config::default();
    if let Some(url) = base_url {
        config.base_url = url;
    }
    config.validate()?;
    config.save(path)?;
    Ok(config)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
