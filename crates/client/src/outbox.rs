// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue of mutating operations awaiting delivery.
//!
//! Each [`OperationKind`] has its own FIFO list persisted as JSONL in the
//! [`LocalStore`]. An enqueue is a single fsynced append; status changes
//! rewrite the kind's list atomically. The in-memory lists are only updated
//! after the write succeeded, so a failed write leaves both sides unchanged.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use ferry_core::{
    ClockSource, Destination, LocalStore, Namespace, OpId, OperationKind, PendingOperation,
};

use crate::events::{Event, EventBus};

/// Retry budget when none is given at enqueue time.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Error type for outbox operations.
#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("outbox storage error: {0}")]
    Store(#[from] ferry_core::Error),

    /// The operation is malformed and was not queued.
    #[error("invalid operation: {0}")]
    Validation(String),
}

/// Result type for outbox operations.
pub type OutboxResult<T> = Result<T, OutboxError>;

/// What `mark_failed` did with an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureOutcome {
    /// Still queued; will be attempted on a later pass.
    Retrying { retry_count: u32 },
    /// Retry budget exhausted; removed from the queue.
    DeadLettered(PendingOperation),
    /// No queued operation has this id.
    Unknown,
}

type Lists = BTreeMap<OperationKind, Vec<PendingOperation>>;

/// Durable per-kind FIFO queue.
pub struct Outbox {
    store: LocalStore,
    clock: Arc<dyn ClockSource>,
    events: EventBus,
    default_max_retries: u32,
    lists: Mutex<Lists>,
}

impl Outbox {
    /// Opens the outbox, loading every persisted list.
    pub fn open(
        store: LocalStore,
        clock: Arc<dyn ClockSource>,
        events: EventBus,
        default_max_retries: u32,
    ) -> OutboxResult<Self> {
        let mut lists = Lists::new();
        for kind in OperationKind::ALL {
            let ns = Namespace::Outbox(kind);
            let recovered = store.read_list::<PendingOperation>(ns)?;
            let mut ops = recovered.records;
            if recovered.torn_tail {
                warn!(%kind, kept = ops.len(), "dropping incomplete last record");
                store.write_list(ns, &ops)?;
            }
            ops.retain(|op| !op.synced);
            if !ops.is_empty() {
                debug!(%kind, count = ops.len(), "loaded queued operations");
            }
            lists.insert(kind, ops);
        }

        Ok(Outbox { store, clock, events, default_max_retries, lists: Mutex::new(lists) })
    }

    fn lock(&self) -> MutexGuard<'_, Lists> {
        self.lists.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queues an operation with the default retry budget.
    pub fn enqueue(
        &self,
        kind: OperationKind,
        payload: serde_json::Value,
        destination: Destination,
    ) -> OutboxResult<OpId> {
        self.enqueue_with(kind, payload, destination, self.default_max_retries)
    }

    /// Queues an operation with an explicit retry budget.
    ///
    /// The operation is on disk when this returns. Never touches the network.
    pub fn enqueue_with(
        &self,
        kind: OperationKind,
        payload: serde_json::Value,
        destination: Destination,
        max_retries: u32,
    ) -> OutboxResult<OpId> {
        if destination.endpoint.trim().is_empty() {
            return Err(OutboxError::Validation("endpoint must not be empty".to_string()));
        }
        if max_retries == 0 {
            return Err(OutboxError::Validation("max_retries must be at least 1".to_string()));
        }

        let now = self.clock.now_ms();
        let op = PendingOperation {
            id: OpId::generate(now),
            kind,
            destination,
            payload,
            created_at: ferry_core::clock::from_millis(now),
            retry_count: 0,
            max_retries,
            synced: false,
        };

        let mut lists = self.lock();
        self.store.append_list(Namespace::Outbox(kind), &op)?;
        lists.entry(kind).or_default().push(op.clone());
        drop(lists);

        debug!(id = %op.id, %kind, destination = %op.destination, "enqueued");
        self.events.publish(Event::OperationEnqueued { id: op.id.clone(), kind });
        Ok(op.id)
    }

    /// Queued operations of one kind, oldest first.
    pub fn list(&self, kind: OperationKind) -> Vec<PendingOperation> {
        self.lock().get(&kind).cloned().unwrap_or_default()
    }

    pub fn get(&self, id: &OpId) -> Option<PendingOperation> {
        self.lock().values().flatten().find(|op| &op.id == id).cloned()
    }

    pub fn len(&self, kind: OperationKind) -> usize {
        self.lock().get(&kind).map_or(0, Vec::len)
    }

    /// Total queued operations across kinds.
    pub fn pending_count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pending_count() == 0
    }

    /// Removes a delivered operation. Returns it, or `None` if unknown.
    pub fn mark_synced(&self, id: &OpId) -> OutboxResult<Option<PendingOperation>> {
        let removed = self.remove(id)?;
        Ok(removed.map(|mut op| {
            op.synced = true;
            op
        }))
    }

    /// Records a failed attempt.
    ///
    /// Once `retry_count` reaches `max_retries` the operation is removed and
    /// returned as dead-lettered.
    pub fn mark_failed(&self, id: &OpId) -> OutboxResult<FailureOutcome> {
        let mut lists = self.lock();
        let Some((kind, index)) = locate(&lists, id) else {
            return Ok(FailureOutcome::Unknown);
        };

        let mut ops = lists[&kind].clone();
        ops[index].retry_count += 1;

        let outcome = if ops[index].is_exhausted() {
            let op = ops.remove(index);
            warn!(id = %op.id, %kind, attempts = op.retry_count, "retries exhausted, dead-lettering");
            FailureOutcome::DeadLettered(op)
        } else {
            FailureOutcome::Retrying { retry_count: ops[index].retry_count }
        };

        self.store.write_list(Namespace::Outbox(kind), &ops)?;
        lists.insert(kind, ops);
        Ok(outcome)
    }

    /// Removes an operation that must never be retried.
    pub fn dead_letter(&self, id: &OpId) -> OutboxResult<Option<PendingOperation>> {
        let removed = self.remove(id)?;
        if let Some(op) = &removed {
            warn!(id = %op.id, kind = %op.kind, "dead-lettered without retry");
        }
        Ok(removed)
    }

    fn remove(&self, id: &OpId) -> OutboxResult<Option<PendingOperation>> {
        let mut lists = self.lock();
        let Some((kind, index)) = locate(&lists, id) else {
            return Ok(None);
        };

        let mut ops = lists[&kind].clone();
        let op = ops.remove(index);
        self.store.write_list(Namespace::Outbox(kind), &ops)?;
        lists.insert(kind, ops);
        Ok(Some(op))
    }
}

fn locate(lists: &Lists, id: &OpId) -> Option<(OperationKind, usize)> {
    lists
        .iter()
        .find_map(|(kind, ops)| ops.iter().position(|op| &op.id == id).map(|i| (*kind, i)))
}

#[cfg(test)]
#[path = "outbox_tests.rs"]
mod tests;
