// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable local storage.
//!
//! One directory holds every piece of persisted state, each under its own
//! namespaced file:
//!
//! ```text
//! <dir>/
//!   session.json                  credential pair
//!   outbox.action.jsonl           pending operations, one list per kind
//!   outbox.form_submission.jsonl
//!   outbox.api_call.jsonl
//!   cache.json                    content cache map
//! ```
//!
//! Documents are replaced atomically; lists are JSONL so enqueue is a single
//! fsynced append.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::jsonl;
use crate::model::OperationKind;

/// Identifies one piece of persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Session,
    Outbox(OperationKind),
    Cache,
}

impl Namespace {
    /// File name for this namespace within the store directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Namespace::Session => "session.json",
            Namespace::Outbox(OperationKind::Action) => "outbox.action.jsonl",
            Namespace::Outbox(OperationKind::FormSubmission) => "outbox.form_submission.jsonl",
            Namespace::Outbox(OperationKind::ApiCall) => "outbox.api_call.jsonl",
            Namespace::Cache => "cache.json",
        }
    }
}

/// Directory-backed store with namespaced keys.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(LocalStore { dir: dir.to_path_buf() })
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `ns`.
    pub fn path(&self, ns: Namespace) -> PathBuf {
        self.dir.join(ns.file_name())
    }

    /// Reads a JSON document, or `None` if it was never written.
    pub fn read_json<T: DeserializeOwned>(&self, ns: Namespace) -> Result<Option<T>> {
        let content = match fs::read_to_string(self.path(ns)) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Atomically replaces a JSON document.
    ///
    /// The session document holds credentials and is owner-only on unix.
    pub fn write_json<T: Serialize>(&self, ns: Namespace, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)?;
        match ns {
            Namespace::Session => jsonl::replace_file_private(&self.path(ns), &json),
            _ => jsonl::replace_file(&self.path(ns), &json),
        }
    }

    /// Deletes the file backing `ns`. Missing files are not an error.
    pub fn remove(&self, ns: Namespace) -> Result<()> {
        match fs::remove_file(self.path(ns)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads every record of a list namespace, oldest first.
    ///
    /// A torn final record is skipped and flagged, see [`jsonl::read_recovering`].
    pub fn read_list<T: DeserializeOwned>(&self, ns: Namespace) -> Result<jsonl::Recovered<T>> {
        jsonl::read_recovering(&self.path(ns))
    }

    /// Appends one record to a list namespace.
    pub fn append_list<T: Serialize>(&self, ns: Namespace, record: &T) -> Result<()> {
        jsonl::append(&self.path(ns), record)
    }

    /// Replaces a whole list namespace.
    pub fn write_list<T: Serialize>(&self, ns: Namespace, records: &[T]) -> Result<()> {
        jsonl::write_all(&self.path(ns), records)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
