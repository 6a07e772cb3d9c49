// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.

use std::path::PathBuf;

/// Environment variable names.
pub mod vars {
    pub const FERRY_CONFIG: &str = "FERRY_CONFIG";
    pub const FERRY_STATE_DIR: &str = "FERRY_STATE_DIR";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Returns the value of `FERRY_CONFIG` if set and non-empty.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::FERRY_CONFIG).map(PathBuf::from)
}

/// Returns the value of `FERRY_STATE_DIR` if set and non-empty.
pub fn state_dir() -> Option<PathBuf> {
    non_empty(vars::FERRY_STATE_DIR).map(PathBuf::from)
}

/// Returns the log filter directives from `RUST_LOG` if set and non-empty.
pub fn log_filter() -> Option<String> {
    non_empty(vars::RUST_LOG)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
