// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed publish/subscribe for state transitions.
//!
//! Every observable outcome of the detached machinery (connectivity changes,
//! auth failures, sync results) is published here. Subscribers get a
//! `tokio::sync::broadcast` receiver; publishing never blocks and never fails
//! when nobody is listening.

use tokio::sync::broadcast;

use ferry_core::{OpId, OperationKind};

use crate::sync::{DeadLetterReport, SyncReport};

/// Buffer per subscriber before old events are dropped (receivers then see
/// `RecvError::Lagged`).
const EVENT_BUFFER: usize = 256;

/// Events published by the client layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Connectivity flipped.
    ConnectivityChanged { online: bool },
    /// A 401 could not be recovered by refreshing the session.
    AuthFailure { reason: String },
    /// An operation was persisted to the outbox.
    OperationEnqueued { id: OpId, kind: OperationKind },
    /// A queued operation was delivered and removed from the outbox.
    OperationSynced { id: OpId, kind: OperationKind },
    /// Operations dropped after exhausting their retry budget.
    DeadLettered(DeadLetterReport),
    /// A sync pass finished.
    SyncCompleted(SyncReport),
}

/// Broadcast hub for [`Event`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        EventBus { tx }
    }

    /// Publishes an event to all current subscribers.
    pub fn publish(&self, event: Event) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    /// Subscribes to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
