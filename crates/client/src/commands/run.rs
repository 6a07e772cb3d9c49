// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running mode: connectivity probe and sync scheduler until Ctrl-C.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::context::Context;
use crate::error::Result;
use crate::events::Event;

pub async fn run(ctx: &Context) -> Result<()> {
    let cancel = CancellationToken::new();

    let mut handles = vec![spawn_event_logger(ctx.events.subscribe(), cancel.child_token())];
    handles.extend(ctx.start(&cancel));

    info!(
        base_url = %ctx.config.base_url,
        pending = ctx.outbox.pending_count(),
        "ferry running"
    );

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    cancel.cancel();

    for handle in handles {
        if let Err(e) = handle.await {
            warn!("background task failed: {}", e);
        }
    }
    Ok(())
}

/// Logs every published event until cancelled.
pub(crate) fn spawn_event_logger(
    mut rx: broadcast::Receiver<Event>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                received = rx.recv() => match received {
                    Ok(event) => log_event(&event),
                    Err(RecvError::Lagged(missed)) => warn!(missed, "event log fell behind"),
                    Err(RecvError::Closed) => return,
                },
            }
        }
    })
}

fn log_event(event: &Event) {
    match event {
        Event::ConnectivityChanged { online: true } => info!("online"),
        Event::ConnectivityChanged { online: false } => warn!("offline, queuing"),
        Event::AuthFailure { reason } => warn!("authentication lost: {}", reason),
        Event::OperationEnqueued { id, kind } => info!(%id, %kind, "enqueued"),
        Event::OperationSynced { id, kind } => info!(%id, %kind, "delivered"),
        Event::DeadLettered(report) => {
            for op in &report.operations {
                warn!(
                    id = %op.id,
                    destination = %op.destination,
                    attempts = op.retry_count,
                    "dropped after exhausting retries"
                );
            }
        }
        Event::SyncCompleted(_) => {}
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
