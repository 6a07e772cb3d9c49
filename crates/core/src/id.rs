// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Operation identifiers.
//!
//! Format: `{created_ms}-{suffix}` where `created_ms` is the zero-padded
//! creation time in milliseconds and `suffix` is 8 random hex chars. The
//! padding makes lexical order match creation order; the suffix keeps ids
//! created in the same millisecond distinct.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SUFFIX_LEN: usize = 8;

/// Unique identifier for a pending operation.
///
/// Assigned once at enqueue time and never changed; doubles as the
/// idempotency key for the operation it names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OpId {
    created_ms: u64,
    suffix: String,
}

impl OpId {
    /// Generates a fresh id for the given creation time.
    pub fn generate(created_ms: u64) -> Self {
        let bytes: [u8; SUFFIX_LEN / 2] = rand::random();
        OpId { created_ms, suffix: hex::encode(bytes) }
    }

    /// Parses an id from its string representation.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Creation time in milliseconds since Unix epoch.
    pub fn created_ms(&self) -> u64 {
        self.created_ms
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:013}-{}", self.created_ms, self.suffix)
    }
}

impl FromStr for OpId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (ms, suffix) = s.split_once('-').ok_or_else(|| Error::InvalidOpId(s.to_string()))?;

        let created_ms = ms.parse::<u64>().map_err(|_| Error::InvalidOpId(s.to_string()))?;

        if suffix.len() != SUFFIX_LEN || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidOpId(s.to_string()));
        }

        Ok(OpId { created_ms, suffix: suffix.to_ascii_lowercase() })
    }
}

impl TryFrom<String> for OpId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<OpId> for String {
    fn from(id: OpId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
