// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline tracking.
//!
//! [`ConnectivityMonitor`] holds the current state and publishes every
//! transition. A transition to online also arms a one-shot reconnect trigger
//! that the sync scheduler waits on, so a pass runs immediately rather than at
//! the next timer tick.
//!
//! [`ConnectivityProbe`] drives the monitor from a periodic health check.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::{Event, EventBus};
use crate::http::{HttpClient, RequestConfig};

/// Current connectivity state and its transitions.
pub struct ConnectivityMonitor {
    state: watch::Sender<bool>,
    reconnected: Notify,
    events: EventBus,
}

impl ConnectivityMonitor {
    pub fn new(online: bool, events: EventBus) -> Self {
        let (state, _) = watch::channel(online);
        ConnectivityMonitor { state, reconnected: Notify::new(), events }
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Records the observed state. Returns true if it changed.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });

        if changed {
            info!(online, "connectivity changed");
            self.events.publish(Event::ConnectivityChanged { online });
            if online {
                // Stores a permit if nobody is waiting yet
                self.reconnected.notify_one();
            }
        }
        changed
    }

    /// Completes on the next offline-to-online transition.
    ///
    /// A transition that happened while nobody was waiting is delivered to
    /// the next caller.
    pub async fn reconnected(&self) {
        self.reconnected.notified().await;
    }
}

/// Periodically checks the health endpoint and feeds the monitor.
pub struct ConnectivityProbe {
    client: Arc<HttpClient>,
    monitor: Arc<ConnectivityMonitor>,
    endpoint: String,
    interval: Duration,
}

impl ConnectivityProbe {
    pub fn new(
        client: Arc<HttpClient>,
        monitor: Arc<ConnectivityMonitor>,
        endpoint: impl Into<String>,
        interval: Duration,
    ) -> Self {
        ConnectivityProbe { client, monitor, endpoint: endpoint.into(), interval }
    }

    /// Checks once and updates the monitor. Returns the observed state.
    ///
    /// Any HTTP answer means the server is reachable; only transport failures
    /// count as offline.
    pub async fn probe_once(&self) -> bool {
        let config = RequestConfig::get(&self.endpoint).skip_auth();
        let online = match self.client.execute(config).await {
            Ok(response) => {
                debug!(status = response.status, "probe answered");
                true
            }
            Err(e) if e.is_transient() => {
                debug!("probe failed: {}", e);
                false
            }
            Err(e) => {
                warn!("probe misconfigured: {}", e);
                return self.monitor.is_online();
            }
        };
        self.monitor.set_online(online);
        online
    }

    /// Probes on every interval tick until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("connectivity probe stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.probe_once().await;
                }
            }
        }
    }

    /// Runs the probe loop on a background task.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
