// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Time-boxed key/value cache for offline reads.
//!
//! Entries carry an absolute expiry. Expired entries are evicted lazily by
//! the read that finds them; there is no background sweep, only the explicit
//! [`ContentCache::purge_expired`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use ferry_core::{CacheEntry, ClockSource, LocalStore, Namespace};

type Entries = BTreeMap<String, CacheEntry>;

/// TTL cache, optionally persisted to the local store.
pub struct ContentCache {
    store: Option<LocalStore>,
    clock: Arc<dyn ClockSource>,
    entries: Mutex<Entries>,
}

impl ContentCache {
    /// A cache that lives only in memory.
    pub fn in_memory(clock: Arc<dyn ClockSource>) -> Self {
        ContentCache { store: None, clock, entries: Mutex::new(Entries::new()) }
    }

    /// Opens the persisted cache map.
    pub fn open(store: LocalStore, clock: Arc<dyn ClockSource>) -> ferry_core::Result<Self> {
        let entries: Entries = store.read_json(Namespace::Cache)?.unwrap_or_default();
        Ok(ContentCache { store: Some(store), clock, entries: Mutex::new(entries) })
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, entries: &Entries) -> ferry_core::Result<()> {
        match &self.store {
            Some(store) => store.write_json(Namespace::Cache, entries),
            None => Ok(()),
        }
    }

    /// Stores `value` until `now + ttl`.
    pub fn put(
        &self,
        key: impl Into<String>,
        value: serde_json::Value,
        ttl: Duration,
    ) -> ferry_core::Result<()> {
        let key = key.into();
        let now = self.clock.now_ms();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let entry = CacheEntry {
            key: key.clone(),
            value,
            stored_at_ms: now,
            expires_at_ms: now.saturating_add(ttl_ms),
        };

        let mut entries = self.lock();
        let mut next = entries.clone();
        next.insert(key, entry);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    /// Serializes and stores a typed value.
    pub fn put_as<T: Serialize>(
        &self,
        key: impl Into<String>,
        value: &T,
        ttl: Duration,
    ) -> ferry_core::Result<()> {
        self.put(key, serde_json::to_value(value)?, ttl)
    }

    /// The value for `key` while unexpired. An expired entry is evicted.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let now = self.clock.now_ms();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }

        entries.remove(key);
        debug!(key, "evicted expired cache entry");
        if let Err(e) = self.persist(&entries) {
            warn!("failed to persist cache eviction: {}", e);
        }
        None
    }

    /// Typed [`get`](Self::get). A value of the wrong shape reads as a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|value| serde_json::from_value(value).ok())
    }

    /// Drops `key`. Returns whether it was present.
    pub fn remove(&self, key: &str) -> ferry_core::Result<bool> {
        let mut entries = self.lock();
        if !entries.contains_key(key) {
            return Ok(false);
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(true)
    }

    /// Stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Evicts every expired entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> ferry_core::Result<usize> {
        let now = self.clock.now_ms();
        let mut entries = self.lock();
        let mut next = entries.clone();
        next.retain(|_, entry| entry.is_live(now));

        let purged = entries.len() - next.len();
        if purged > 0 {
            self.persist(&next)?;
            *entries = next;
        }
        Ok(purged)
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
