// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outbox replay.
//!
//! A pass walks every kind's list oldest-first and attempts each operation
//! once. Outcomes per operation:
//!
//! ```text
//! Queued ─► InFlight ─┬─► Synced (removed)
//!                     ├─► Retrying ─► Queued (next pass)
//!                     └─► DeadLettered (removed, reported)
//! ```
//!
//! Passes run on a fixed interval and immediately on reconnect. Only one
//! pass runs at a time; a trigger that arrives mid-pass is a no-op. Nothing
//! here returns errors to a caller: outcomes are published on the
//! [`EventBus`] and visible in the outbox afterwards.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ferry_core::{OpId, OperationKind, PendingOperation};

use crate::connectivity::ConnectivityMonitor;
use crate::events::{Event, EventBus};
use crate::http::{HttpClient, HttpError, HttpResult, RequestConfig, IDEMPOTENCY_KEY};
use crate::outbox::{FailureOutcome, Outbox};

/// Default time between periodic passes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

/// Result of one completed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Delivered and removed.
    pub synced: Vec<OpId>,
    /// Failed this pass; still queued.
    pub retried: Vec<OpId>,
    /// Dropped this pass.
    pub dead_lettered: Vec<OpId>,
}

impl SyncReport {
    /// True if the pass found nothing to do.
    pub fn is_empty(&self) -> bool {
        self.synced.is_empty() && self.retried.is_empty() && self.dead_lettered.is_empty()
    }
}

/// Operations dropped during one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DeadLetterReport {
    pub operations: Vec<PendingOperation>,
}

impl DeadLetterReport {
    pub fn count(&self) -> usize {
        self.operations.len()
    }

    pub fn ids(&self) -> Vec<OpId> {
        self.operations.iter().map(|op| op.id.clone()).collect()
    }
}

/// What a call to [`SyncScheduler::run_pass`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(SyncReport),
    /// Skipped because the monitor reports offline.
    Offline,
    /// Another pass was already in flight.
    AlreadyRunning,
}

enum Delivery {
    Synced,
    Failed(String),
    Rejected(String),
}

/// Drains the outbox through the HTTP client.
pub struct SyncScheduler {
    outbox: Arc<Outbox>,
    client: Arc<HttpClient>,
    connectivity: Arc<ConnectivityMonitor>,
    events: EventBus,
    interval: Duration,
    pass_lock: tokio::sync::Mutex<()>,
}

impl SyncScheduler {
    pub fn new(
        outbox: Arc<Outbox>,
        client: Arc<HttpClient>,
        connectivity: Arc<ConnectivityMonitor>,
        events: EventBus,
        interval: Duration,
    ) -> Self {
        SyncScheduler {
            outbox,
            client,
            connectivity,
            events,
            interval,
            pass_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Runs one pass over every kind, unless offline or already running.
    pub async fn run_pass(&self) -> PassOutcome {
        let Ok(_guard) = self.pass_lock.try_lock() else {
            debug!("sync pass already running");
            return PassOutcome::AlreadyRunning;
        };

        if !self.connectivity.is_online() {
            debug!("offline, skipping sync pass");
            return PassOutcome::Offline;
        }

        let mut report = SyncReport::default();
        let mut dead = Vec::new();

        for kind in OperationKind::ALL {
            for op in self.outbox.list(kind) {
                self.process(op, &mut report, &mut dead).await;
            }
        }

        if !dead.is_empty() {
            warn!(count = dead.len(), "operations dead-lettered");
            self.events.publish(Event::DeadLettered(DeadLetterReport { operations: dead }));
        }

        if report.is_empty() {
            debug!("sync pass complete, nothing queued");
        } else {
            info!(
                synced = report.synced.len(),
                retried = report.retried.len(),
                dead_lettered = report.dead_lettered.len(),
                "sync pass complete"
            );
        }
        self.events.publish(Event::SyncCompleted(report.clone()));
        PassOutcome::Completed(report)
    }

    async fn process(
        &self,
        op: PendingOperation,
        report: &mut SyncReport,
        dead: &mut Vec<PendingOperation>,
    ) {
        match self.deliver(&op).await {
            Delivery::Synced => match self.outbox.mark_synced(&op.id) {
                Ok(_) => {
                    debug!(id = %op.id, "synced");
                    self.events.publish(Event::OperationSynced { id: op.id.clone(), kind: op.kind });
                    report.synced.push(op.id);
                }
                // Stays queued; the server is expected to dedupe on the key
                Err(e) => warn!(id = %op.id, "delivered but could not be removed: {}", e),
            },
            Delivery::Failed(reason) => {
                debug!(id = %op.id, "delivery failed: {}", reason);
                match self.outbox.mark_failed(&op.id) {
                    Ok(FailureOutcome::Retrying { .. }) => report.retried.push(op.id),
                    Ok(FailureOutcome::DeadLettered(op)) => {
                        report.dead_lettered.push(op.id.clone());
                        dead.push(op);
                    }
                    Ok(FailureOutcome::Unknown) => {}
                    Err(e) => warn!(id = %op.id, "could not record failure: {}", e),
                }
            }
            Delivery::Rejected(reason) => {
                warn!(id = %op.id, "operation is invalid, not retrying: {}", reason);
                match self.outbox.dead_letter(&op.id) {
                    Ok(Some(op)) => {
                        report.dead_lettered.push(op.id.clone());
                        dead.push(op);
                    }
                    Ok(None) => {}
                    Err(e) => warn!(id = %op.id, "could not drop operation: {}", e),
                }
            }
        }
    }

    async fn deliver(&self, op: &PendingOperation) -> Delivery {
        let config = match request_for(op) {
            Ok(config) => config,
            Err(e) => return Delivery::Rejected(e.to_string()),
        };

        match self.client.execute(config).await {
            Ok(response) if response.is_success() => Delivery::Synced,
            Ok(response) => Delivery::Failed(format!("status {}", response.status)),
            Err(e @ HttpError::Validation(_)) => Delivery::Rejected(e.to_string()),
            Err(e) => Delivery::Failed(e.to_string()),
        }
    }

    /// Runs passes on the interval and on reconnect until cancelled.
    ///
    /// Cancellation is observed between passes; a running pass completes.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("sync scheduler stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.run_pass().await;
                }
                _ = self.connectivity.reconnected() => {
                    info!("back online, syncing now");
                    self.run_pass().await;
                }
            }
        }
    }

    /// Runs the scheduler loop on a background task.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}

/// Builds the replay request. The operation id travels as the idempotency key.
fn request_for(op: &PendingOperation) -> HttpResult<RequestConfig> {
    let mut config = RequestConfig::new(op.destination.method, &op.destination.endpoint)
        .header(IDEMPOTENCY_KEY, op.id.to_string());
    if !op.payload.is_null() {
        config = config.json(&op.payload)?;
    }
    Ok(config)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
