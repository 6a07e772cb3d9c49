// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::auth::AuthError;
use crate::http::HttpError;
use crate::outbox::OutboxError;

/// All errors surfaced by the ferry client crate.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no state directory could be determined\n  hint: set state_dir in ferry.toml or FERRY_STATE_DIR")]
    NoStateDir,

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("not cached: {0}")]
    CacheMiss(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] ferry_core::Error),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Outbox(#[from] OutboxError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ferry client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
