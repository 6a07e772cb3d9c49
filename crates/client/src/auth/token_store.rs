// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Credential pair ownership and coalesced refresh.
//!
//! Every change to the pair (save, refresh, clear) bumps a generation
//! counter. A refresh names the generation it found stale; callers that were
//! queued behind an in-flight refresh see the generation has moved on and
//! take its result instead of refreshing again.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, warn};

use ferry_core::{ClockSource, CredentialPair, LocalStore, Method, Namespace};

use crate::http::{Headers, HttpRequest, HttpTransport, CONTENT_TYPE};

use super::{AuthError, AuthResult, TokenResponse};

struct SessionState {
    pair: Option<CredentialPair>,
    generation: u64,
}

/// Holds the current credential pair; persists and clears it.
pub struct TokenStore {
    store: LocalStore,
    transport: Arc<dyn HttpTransport>,
    refresh_url: String,
    timeout: Duration,
    clock: Arc<dyn ClockSource>,
    state: Mutex<SessionState>,
    /// Serializes refresh calls; holds the reason of the last failed one.
    refresh_lock: tokio::sync::Mutex<Option<String>>,
}

impl TokenStore {
    /// Opens the token store, loading any persisted pair.
    pub fn open(
        store: LocalStore,
        transport: Arc<dyn HttpTransport>,
        refresh_url: impl Into<String>,
        timeout: Duration,
        clock: Arc<dyn ClockSource>,
    ) -> AuthResult<Self> {
        let pair: Option<CredentialPair> = store.read_json(Namespace::Session)?;

        Ok(TokenStore {
            store,
            transport,
            refresh_url: refresh_url.into(),
            timeout,
            clock,
            state: Mutex::new(SessionState { pair, generation: 0 }),
            refresh_lock: tokio::sync::Mutex::new(None),
        })
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The current pair, if logged in.
    pub fn current(&self) -> Option<CredentialPair> {
        self.lock_state().pair.clone()
    }

    /// The current pair together with its generation.
    pub fn snapshot(&self) -> (Option<CredentialPair>, u64) {
        let state = self.lock_state();
        (state.pair.clone(), state.generation)
    }

    pub fn generation(&self) -> u64 {
        self.lock_state().generation
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock_state().pair.is_some()
    }

    /// Persists and installs a new pair.
    pub fn save(&self, pair: CredentialPair) -> AuthResult<()> {
        let mut state = self.lock_state();
        self.store.write_json(Namespace::Session, &pair)?;
        state.pair = Some(pair);
        state.generation += 1;
        Ok(())
    }

    /// Removes the pair from memory and disk.
    pub fn clear(&self) -> AuthResult<()> {
        let mut state = self.lock_state();
        self.store.remove(Namespace::Session)?;
        state.pair = None;
        state.generation += 1;
        Ok(())
    }

    /// Refreshes the current pair.
    ///
    /// Concurrent callers share one refresh call.
    pub async fn refresh(&self) -> AuthResult<CredentialPair> {
        let seen = self.generation();
        self.refresh_from(seen).await
    }

    /// Refreshes the pair of generation `seen`.
    ///
    /// If the pair has changed since `seen` (another caller refreshed, logged
    /// in, or the session was cleared), no call is made: the current pair is
    /// returned, or the failure that cleared it.
    pub async fn refresh_from(&self, seen: u64) -> AuthResult<CredentialPair> {
        let mut last_failure = self.refresh_lock.lock().await;

        let (pair, generation) = self.snapshot();
        if generation != seen {
            return match pair {
                Some(pair) => Ok(pair),
                None => Err(AuthError::RefreshFailed(
                    last_failure.clone().unwrap_or_else(|| "session was cleared".to_string()),
                )),
            };
        }

        let pair = pair.ok_or(AuthError::NoSession)?;

        match self.call_refresh(&pair).await {
            Ok(fresh) => {
                self.save(fresh.clone())?;
                *last_failure = None;
                info!("session refreshed");
                Ok(fresh)
            }
            Err(reason) => {
                warn!("session refresh failed, clearing credentials: {}", reason);
                if let Err(e) = self.clear() {
                    warn!("failed to clear credentials: {}", e);
                }
                *last_failure = Some(reason.clone());
                Err(AuthError::RefreshFailed(reason))
            }
        }
    }

    /// Performs the refresh call itself, bypassing the interceptor pipeline.
    async fn call_refresh(&self, pair: &CredentialPair) -> Result<CredentialPair, String> {
        let body = serde_json::json!({ "refresh_token": pair.refresh_token });
        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE.to_string(), "application/json".to_string());

        let request = HttpRequest {
            method: Method::Post,
            url: self.refresh_url.clone(),
            headers,
            body: Some(body.to_string().into()),
            timeout: self.timeout,
            skip_auth: true,
            credential_generation: None,
        };

        let response = match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(format!("refresh call failed: {}", e)),
            Err(_) => return Err("refresh call timed out".to_string()),
        };

        if !response.is_success() {
            return Err(format!("refresh rejected with status {}", response.status));
        }

        let tokens: TokenResponse = response.json().map_err(|e| e.to_string())?;
        tokens
            .into_pair(Some(&pair.refresh_token), self.clock.now())
            .ok_or_else(|| "refresh response missing refresh token".to_string())
    }
}
