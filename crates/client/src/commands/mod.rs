// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod cache;
pub mod enqueue;
pub mod init;
pub mod pending;
pub mod request;
pub mod run;
pub mod session;
pub mod sync;

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use crate::error::Result;

/// Parses a JSON command-line argument.
pub fn parse_json(raw: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(raw)?)
}
