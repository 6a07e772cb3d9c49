// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL (JSON Lines) file utilities.
//!
//! Provides durable append-only storage for JSON-serializable records.
//! Each record is stored as a single JSON line with fsync for durability.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Appends a record to a JSONL file with fsync for durability.
pub fn append<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let json = serde_json::to_string(record)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{json}")?;
    file.sync_all()?;

    Ok(())
}

/// Records read by [`read_recovering`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered<T> {
    pub records: Vec<T>,
    /// The last line did not parse and was skipped.
    pub torn_tail: bool,
}

/// Reads all records, tolerating an unparseable final line.
///
/// Blank lines are skipped and a missing file reads as empty.
/// An append interrupted by a crash leaves at most one partial line at the
/// end of the file. That line is skipped and reported through
/// [`Recovered::torn_tail`]; a bad line anywhere else is still an error.
pub fn read_recovering<T: DeserializeOwned>(path: &Path) -> Result<Recovered<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Recovered { records: Vec::new(), torn_tail: false })
        }
        Err(e) => return Err(e.into()),
    };

    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let mut records = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(_) if i + 1 == lines.len() => return Ok(Recovered { records, torn_tail: true }),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Recovered { records, torn_tail: false })
}

/// Writes all records to a JSONL file, replacing existing content.
///
/// The records go to a sibling temp file which is fsynced and renamed over
/// `path`, so readers see either the old or the new list, never a prefix.
pub fn write_all<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut buf = String::new();
    for record in records {
        buf.push_str(&serde_json::to_string(record)?);
        buf.push('\n');
    }
    replace_file(path, buf.as_bytes())
}

/// Atomically replaces `path` with `contents`.
pub fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    replace(path, contents, false)
}

/// Like [`replace_file`], but the file is readable by the owner only (unix).
pub fn replace_file_private(path: &Path, contents: &[u8]) -> Result<()> {
    replace(path, contents, true)
}

fn replace(path: &Path, contents: &[u8], private: bool) -> Result<()> {
    let tmp = temp_path(path);
    {
        let mut file = create_truncated(&tmp, private)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    sync_parent(path)
}

#[cfg(unix)]
fn create_truncated(path: &Path, private: bool) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    if private {
        options.mode(0o600);
    }
    let file = options.open(path)?;
    // A leftover temp file keeps its old mode
    if private {
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}

#[cfg(not(unix))]
fn create_truncated(path: &Path, _private: bool) -> std::io::Result<File> {
    File::create(path)
}

/// Flushes the directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_parent(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> Result<()> {
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
