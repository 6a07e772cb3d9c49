// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers: a scripted in-memory transport.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ferry_core::clock::ManualClock;
use ferry_core::{CredentialPair, LocalStore, Method};

use crate::auth::TokenStore;
use crate::events::EventBus;
use crate::http::{
    AuthInterceptor, BoxFuture, HttpClient, HttpRequest, HttpResponse, HttpTransport,
    RefreshOn401Interceptor, TransportError, TransportResult,
};

/// Base URL the mock answers for.
pub const MOCK_BASE: &str = "http://mock.test";

/// A scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    Json(u16, serde_json::Value),
    Status(u16),
    Fail(TransportError),
    /// 200 if the request carries `Bearer <token>`, 401 otherwise.
    RequireBearer(String),
    /// Waits before producing the inner reply.
    Delayed(Duration, Box<MockReply>),
}

/// Mock transport for testing without real sockets.
///
/// Replies are queued per route (`"METHOD /path"`); the last reply for a
/// route repeats once the queue is down to one. Unknown routes answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<MockReply>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn route_key(method: Method, path: &str) -> String {
    format!("{} {}", method, path)
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(MockTransport::default())
    }

    /// Queue a reply for a route.
    pub fn on(&self, method: Method, path: &str, reply: MockReply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(route_key(method, path))
            .or_default()
            .push_back(reply);
        self
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests seen for one route.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        let url = format!("{}{}", MOCK_BASE, path);
        self.requests().into_iter().filter(|r| r.method == method && r.url == url).collect()
    }

    /// Number of requests seen for one route.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    fn next_reply(&self, request: &HttpRequest) -> MockReply {
        let path = request.url.strip_prefix(MOCK_BASE).unwrap_or(&request.url).to_string();
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&route_key(request.method, &path)) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(MockReply::Status(404)),
            None => MockReply::Status(404),
        }
    }
}

async fn resolve(request: &HttpRequest, mut reply: MockReply) -> TransportResult<HttpResponse> {
    loop {
        match reply {
            MockReply::Json(status, value) => return Ok(HttpResponse::json_body(status, &value)),
            MockReply::Status(status) => return Ok(HttpResponse::new(status, "")),
            MockReply::Fail(error) => return Err(error),
            MockReply::RequireBearer(token) => {
                let expected = format!("Bearer {}", token);
                let status = if request.header("authorization") == Some(expected.as_str()) {
                    200
                } else {
                    401
                };
                return Ok(HttpResponse::new(status, ""));
            }
            MockReply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
        }
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, TransportResult<HttpResponse>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            let reply = self.next_reply(&request);
            resolve(&request, reply).await
        })
    }
}

/// A token response body as the auth endpoints return it.
pub fn token_body(access: &str, refresh: &str) -> serde_json::Value {
    serde_json::json!({ "access_token": access, "refresh_token": refresh })
}

/// A credential pair issued at the epoch.
pub fn pair(access: &str, refresh: &str) -> CredentialPair {
    CredentialPair::new(access, refresh, ferry_core::clock::from_millis(0))
}

/// Path of the refresh endpoint used by [`token_store`].
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Opens a token store in `dir` that refreshes against the mock.
pub fn token_store(dir: &Path, transport: Arc<MockTransport>) -> Arc<TokenStore> {
    let store = LocalStore::open(dir).unwrap();
    let clock = Arc::new(ManualClock::new(1_000));
    Arc::new(
        TokenStore::open(
            store,
            transport,
            format!("{}{}", MOCK_BASE, REFRESH_PATH),
            Duration::from_secs(5),
            clock,
        )
        .unwrap(),
    )
}

/// A client wired with the auth and refresh-on-401 interceptors.
pub fn authed_client(
    transport: Arc<MockTransport>,
    tokens: Arc<TokenStore>,
    events: EventBus,
) -> Arc<HttpClient> {
    Arc::new(
        HttpClient::builder(transport, MOCK_BASE)
            .request_interceptor(Arc::new(AuthInterceptor::new(tokens.clone())))
            .response_interceptor(Arc::new(RefreshOn401Interceptor::new(tokens, events)))
            .build(),
    )
}
