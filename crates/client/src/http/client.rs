// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The HTTP client.
//!
//! Provides a high-level interface for:
//! - Building requests from defaults and per-call settings
//! - Running request and response interceptor chains
//! - Enforcing a per-request timeout

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use super::interceptor::{Exchange, Replay, RequestInterceptor, ResponseInterceptor};
use super::transport::{HttpTransport, TransportError};
use super::types::{build_request, Headers, HttpRequest, HttpResponse, RequestConfig};
use super::{HttpError, HttpResult};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client with an interceptor pipeline.
pub struct HttpClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    default_headers: Headers,
    default_timeout: Duration,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    client: HttpClient,
}

impl HttpClientBuilder {
    pub fn default_headers(mut self, headers: Headers) -> Self {
        self.client.default_headers = headers;
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.client.default_timeout = timeout;
        self
    }

    /// Appends a request interceptor; interceptors run in the order added.
    pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.client.request_interceptors.push(interceptor);
        self
    }

    /// Appends a response interceptor; interceptors run in the order added.
    pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.client.response_interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> HttpClient {
        self.client
    }
}

impl HttpClient {
    pub fn builder(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> HttpClientBuilder {
        HttpClientBuilder {
            client: HttpClient {
                transport,
                base_url: base_url.into(),
                default_headers: Headers::new(),
                default_timeout: DEFAULT_TIMEOUT,
                request_interceptors: Vec::new(),
                response_interceptors: Vec::new(),
            },
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Executes a request through the full pipeline.
    ///
    /// Any HTTP status is `Ok`; only transport failures and malformed
    /// requests are errors. A timeout yields
    /// `HttpError::Transient(TransportError::Timeout)`.
    pub async fn execute(&self, config: RequestConfig) -> HttpResult<HttpResponse> {
        let body = config.body.clone();
        let (mut request, mut response) = self.dispatch(&config, body.clone()).await?;

        let replay = Replay::new(self, &config, body);
        for interceptor in &self.response_interceptors {
            response = interceptor.intercept(Exchange::new(&request, response, &replay)).await?;
            if let Some(replayed) = replay.take_sent() {
                request = replayed;
            }
        }

        Ok(response)
    }

    /// Executes a request and decodes a 2xx JSON body.
    ///
    /// Non-2xx statuses become [`HttpError::Decode`] carrying the status.
    pub async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        config: RequestConfig,
    ) -> HttpResult<T> {
        let response = self.execute(config).await?;
        if !response.is_success() {
            return Err(HttpError::Decode(format!("unexpected status {}", response.status)));
        }
        response.json()
    }

    /// Builds the request, runs request interceptors, and sends it with the
    /// timeout armed. Response interceptors are not involved.
    pub(crate) async fn dispatch(
        &self,
        config: &RequestConfig,
        body: Option<Bytes>,
    ) -> HttpResult<(HttpRequest, HttpResponse)> {
        let mut request = build_request(
            config,
            body,
            &self.base_url,
            &self.default_headers,
            self.default_timeout,
        )?;
        for interceptor in &self.request_interceptors {
            request = interceptor.intercept(request);
        }

        let deadline = request.timeout;
        debug!(method = %request.method, url = %request.url, "dispatching");

        let response = match tokio::time::timeout(deadline, self.transport.send(request.clone())).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                debug!(url = %request.url, "transport error: {}", e);
                return Err(e.into());
            }
            Err(_) => {
                debug!(url = %request.url, ?deadline, "request timed out");
                return Err(HttpError::Transient(TransportError::Timeout));
            }
        };

        debug!(url = %request.url, status = response.status, "response");
        Ok((request, response))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
