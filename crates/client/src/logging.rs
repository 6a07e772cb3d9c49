// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup for the binary.

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::env;

/// Log file written by the long-running `run` command, inside the state dir.
pub const LOG_FILE_NAME: &str = "ferry.log";

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides `default_level` unless it is empty or unparseable. With `log_path`, output is appended
/// to that file (falling back to stderr if it cannot be opened). Calling this
/// twice is a no-op.
pub fn setup(log_path: Option<&Path>, default_level: &str) {
    let filter = env::log_filter()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    let file = log_path.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        fs::OpenOptions::new().create(true).append(true).open(path).ok()
    });

    let _ = match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
}
