// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The explicit wiring root.
//!
//! A [`Context`] is built once at process start from a [`Config`] and handed
//! to whatever needs the client layer. There is no global instance.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use ferry_core::{ClockSource, LocalStore, SystemClock};

use crate::auth::{Session, TokenStore};
use crate::cache::ContentCache;
use crate::config::Config;
use crate::connectivity::{ConnectivityMonitor, ConnectivityProbe};
use crate::error::Result;
use crate::events::EventBus;
use crate::http::{
    resolve_url, AuthInterceptor, HttpClient, HttpTransport, RefreshOn401Interceptor,
    ReqwestTransport,
};
use crate::outbox::Outbox;
use crate::sync::SyncScheduler;

/// Every component of the client layer, wired together.
pub struct Context {
    pub config: Config,
    pub store: LocalStore,
    pub events: EventBus,
    pub tokens: Arc<TokenStore>,
    pub client: Arc<HttpClient>,
    pub session: Session,
    pub connectivity: Arc<ConnectivityMonitor>,
    /// Absent when probing is disabled.
    pub probe: Option<Arc<ConnectivityProbe>>,
    pub outbox: Arc<Outbox>,
    pub cache: ContentCache,
    pub scheduler: Arc<SyncScheduler>,
}

impl Context {
    /// Builds a context that talks HTTP through reqwest.
    pub fn open(config: Config) -> Result<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Builds a context over the given transport.
    pub fn with_transport(config: Config, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        Self::with_parts(config, transport, Arc::new(SystemClock))
    }

    /// Builds a context over the given transport and clock.
    pub fn with_parts(
        config: Config,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn ClockSource>,
    ) -> Result<Self> {
        config.validate()?;

        let state_dir = config.resolve_state_dir()?;
        let store = LocalStore::open(&state_dir)?;
        debug!(state_dir = %state_dir.display(), "opened local store");

        let events = EventBus::new();

        let refresh_url = resolve_url(&config.base_url, &config.auth.refresh)?;
        let tokens = Arc::new(TokenStore::open(
            store.clone(),
            transport.clone(),
            refresh_url,
            config.timeout(),
            clock.clone(),
        )?);

        let client = Arc::new(
            HttpClient::builder(transport, config.base_url.clone())
                .default_headers(config.headers.clone())
                .default_timeout(config.timeout())
                .request_interceptor(Arc::new(AuthInterceptor::new(tokens.clone())))
                .response_interceptor(Arc::new(RefreshOn401Interceptor::new(
                    tokens.clone(),
                    events.clone(),
                )))
                .build(),
        );

        let session = Session::new(
            client.clone(),
            tokens.clone(),
            clock.clone(),
            config.auth.login.clone(),
            config.auth.logout.clone(),
        );

        // Without a probe nothing would ever flip the state, so assume online
        let probe_interval = config.probe_interval();
        let connectivity =
            Arc::new(ConnectivityMonitor::new(probe_interval.is_none(), events.clone()));
        let probe = probe_interval.map(|interval| {
            Arc::new(ConnectivityProbe::new(
                client.clone(),
                connectivity.clone(),
                config.health_endpoint.clone(),
                interval,
            ))
        });

        let outbox =
            Arc::new(Outbox::open(store.clone(), clock.clone(), events.clone(), config.max_retries)?);
        let cache = ContentCache::open(store.clone(), clock)?;

        let scheduler = Arc::new(SyncScheduler::new(
            outbox.clone(),
            client.clone(),
            connectivity.clone(),
            events.clone(),
            config.sync_interval(),
        ));

        Ok(Context {
            config,
            store,
            events,
            tokens,
            client,
            session,
            connectivity,
            probe,
            outbox,
            cache,
            scheduler,
        })
    }

    /// Updates connectivity from one probe. Without a probe, reports the
    /// current state.
    pub async fn check_connectivity(&self) -> bool {
        match &self.probe {
            Some(probe) => probe.probe_once().await,
            None => self.connectivity.is_online(),
        }
    }

    /// Starts the background tasks: the probe (if enabled) and the scheduler.
    pub fn start(&self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        if let Some(probe) = &self.probe {
            handles.push(probe.clone().spawn(cancel.child_token()));
        }
        handles.push(self.scheduler.clone().spawn(cancel.child_token()));
        handles
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
