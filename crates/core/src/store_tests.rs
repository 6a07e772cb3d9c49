// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::collections::{BTreeMap, HashSet};
use tempfile::TempDir;

#[test]
fn open_creates_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nested/state");

    let store = LocalStore::open(&root).unwrap();

    assert!(root.is_dir());
    assert_eq!(store.dir(), root.as_path());
}

#[test]
fn namespaces_use_distinct_files() {
    let mut names = HashSet::new();
    names.insert(Namespace::Session.file_name());
    names.insert(Namespace::Cache.file_name());
    for kind in OperationKind::ALL {
        names.insert(Namespace::Outbox(kind).file_name());
    }
    assert_eq!(names.len(), 5);
}

#[test]
fn read_json_missing_is_none() {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::open(dir.path()).unwrap();

    let value: Option<BTreeMap<String, u32>> = store.read_json(Namespace::Cache).unwrap();
    assert!(value.is_none());
}

#[test]
fn write_then_read_json() {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::open(dir.path()).unwrap();

    let mut map = BTreeMap::new();
    map.insert("a".to_string(), 1u32);
    store.write_json(Namespace::Cache, &map).unwrap();

    let back: Option<BTreeMap<String, u32>> = store.read_json(Namespace::Cache).unwrap();
    assert_eq!(back, Some(map));
}

#[test]
fn remove_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::open(dir.path()).unwrap();

    store.write_json(Namespace::Session, &"x").unwrap();
    store.remove(Namespace::Session).unwrap();
    store.remove(Namespace::Session).unwrap();

    assert!(!store.path(Namespace::Session).exists());
}

#[test]
fn lists_append_and_rewrite() {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::open(dir.path()).unwrap();
    let ns = Namespace::Outbox(OperationKind::ApiCall);

    store.append_list(ns, &1u32).unwrap();
    store.append_list(ns, &2u32).unwrap();
    assert_eq!(store.read_list::<u32>(ns).unwrap().records, vec![1, 2]);

    store.write_list(ns, &[2u32]).unwrap();
    assert_eq!(store.read_list::<u32>(ns).unwrap().records, vec![2]);

    // Other kinds are untouched
    let other = Namespace::Outbox(OperationKind::Action);
    assert!(store.read_list::<u32>(other).unwrap().records.is_empty());
}

#[cfg(unix)]
#[test]
fn session_document_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let store = LocalStore::open(dir.path()).unwrap();

    store.write_json(Namespace::Session, &"token").unwrap();
    store.write_json(Namespace::Cache, &"value").unwrap();

    let mode = |ns| fs::metadata(store.path(ns)).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(Namespace::Session), 0o600);
    assert_ne!(mode(Namespace::Cache), 0o600);
}
