// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ferry-core operations.

use thiserror::Error;

/// All possible errors that can occur in ferry-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid operation kind: '{0}'\n  hint: valid kinds are: action, form-submission, api-call")]
    InvalidKind(String),

    #[error("invalid method: '{0}'\n  hint: valid methods are: GET, POST, PUT, PATCH, DELETE")]
    InvalidMethod(String),

    #[error("invalid operation id: '{0}'")]
    InvalidOpId(String),

    #[error("{0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for ferry-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
