// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request and response interceptors.
//!
//! Interceptors are transforms over a single exchange. They hold no
//! per-call state of their own; anything shared across calls lives in the
//! [`TokenStore`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::events::{Event, EventBus};

use super::client::HttpClient;
use super::types::{HttpRequest, HttpResponse, RequestConfig, AUTHORIZATION};
use super::{BoxFuture, HttpError, HttpResult};

/// Transforms every outgoing request, in registration order.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: HttpRequest) -> HttpRequest;
}

/// Transforms every response, in registration order.
pub trait ResponseInterceptor: Send + Sync {
    fn intercept<'a>(&'a self, exchange: Exchange<'a>) -> BoxFuture<'a, HttpResult<HttpResponse>>;
}

/// One request/response pair handed to a [`ResponseInterceptor`].
pub struct Exchange<'a> {
    /// The request that produced `response`. After an earlier interceptor
    /// replayed the call, this is the replayed request.
    pub request: &'a HttpRequest,
    pub response: HttpResponse,
    replay: &'a Replay<'a>,
}

impl<'a> Exchange<'a> {
    pub(crate) fn new(request: &'a HttpRequest, response: HttpResponse, replay: &'a Replay<'a>) -> Self {
        Exchange { request, response, replay }
    }

    /// Sends the original request again.
    ///
    /// Request interceptors run again (so a refreshed credential is picked
    /// up); response interceptors do not. Only one replay is allowed per
    /// original call, across all interceptors.
    pub async fn replay(&self) -> HttpResult<HttpResponse> {
        self.replay.send().await
    }
}

/// Replay handle shared by every interceptor of one `execute` call.
pub(crate) struct Replay<'a> {
    client: &'a HttpClient,
    config: &'a RequestConfig,
    body: Option<Bytes>,
    used: AtomicBool,
    sent: Mutex<Option<HttpRequest>>,
}

impl<'a> Replay<'a> {
    pub(crate) fn new(client: &'a HttpClient, config: &'a RequestConfig, body: Option<Bytes>) -> Self {
        Replay { client, config, body, used: AtomicBool::new(false), sent: Mutex::new(None) }
    }

    async fn send(&self) -> HttpResult<HttpResponse> {
        if self.used.swap(true, Ordering::SeqCst) {
            return Err(HttpError::RetryExhausted);
        }
        let (request, response) = self.client.dispatch(self.config, self.body.clone()).await?;
        *self.sent.lock().unwrap_or_else(|e| e.into_inner()) = Some(request);
        Ok(response)
    }

    /// The replayed request, once, if a replay went out since the last call.
    pub(crate) fn take_sent(&self) -> Option<HttpRequest> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

/// Attaches `Authorization: Bearer <access token>` unless `skip_auth` is set.
pub struct AuthInterceptor {
    tokens: Arc<TokenStore>,
}

impl AuthInterceptor {
    pub fn new(tokens: Arc<TokenStore>) -> Self {
        AuthInterceptor { tokens }
    }
}

impl RequestInterceptor for AuthInterceptor {
    fn intercept(&self, mut request: HttpRequest) -> HttpRequest {
        if request.skip_auth {
            return request;
        }
        let (pair, generation) = self.tokens.snapshot();
        if let Some(pair) = pair {
            request.headers.insert(AUTHORIZATION.to_string(), pair.bearer());
        }
        request.credential_generation = Some(generation);
        request
    }
}

/// On a 401, refreshes the session once and replays the original request.
///
/// If the refresh fails, an [`Event::AuthFailure`] is published and the
/// original 401 response is returned unchanged.
pub struct RefreshOn401Interceptor {
    tokens: Arc<TokenStore>,
    events: EventBus,
}

impl RefreshOn401Interceptor {
    pub fn new(tokens: Arc<TokenStore>, events: EventBus) -> Self {
        RefreshOn401Interceptor { tokens, events }
    }
}

impl ResponseInterceptor for RefreshOn401Interceptor {
    fn intercept<'a>(&'a self, exchange: Exchange<'a>) -> BoxFuture<'a, HttpResult<HttpResponse>> {
        Box::pin(async move {
            if !exchange.response.is_unauthorized() || exchange.request.skip_auth {
                return Ok(exchange.response);
            }

            let seen = exchange
                .request
                .credential_generation
                .unwrap_or_else(|| self.tokens.generation());

            match self.tokens.refresh_from(seen).await {
                Ok(_) => {
                    debug!(url = %exchange.request.url, "session refreshed, replaying request");
                    exchange.replay().await
                }
                Err(e) => {
                    warn!(url = %exchange.request.url, "unauthorized and refresh failed: {}", e);
                    self.events.publish(Event::AuthFailure { reason: e.to_string() });
                    Ok(exchange.response)
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "interceptor_tests.rs"]
mod tests;
