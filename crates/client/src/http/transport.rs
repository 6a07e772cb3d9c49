// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for HTTP exchanges.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP connections for production (reqwest)
//! - Mock transports for unit testing

use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use ferry_core::Method;

use super::types::{header_name, Headers, HttpRequest, HttpResponse};
use super::BoxFuture;

/// Error type for transport operations.
///
/// `Timeout` and `Connect` are transient: the request may succeed if tried
/// again later. `Invalid` means the request could not be built at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete before its deadline.
    #[error("timeout")]
    Timeout,

    /// Connection could not be established or broke mid-exchange.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request was rejected before sending (bad URL, bad header value).
    #[error("invalid request: {0}")]
    Invalid(String),
}


/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport trait for request/response exchanges.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations. Any HTTP status, including
/// 4xx/5xx, is a successful exchange at this level.
pub trait HttpTransport: Send + Sync {
    /// Sends a request and waits for the complete response.
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, TransportResult<HttpResponse>>;
}

/// HTTP transport implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a new reqwest transport.
    pub fn new() -> Self {
        ReqwestTransport { client: reqwest::Client::new() }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn map_error(error: reqwest::Error) -> TransportError {
    let message = match std::error::Error::source(&error) {
        Some(cause) => format!("{}: {}", error, cause),
        None => error.to_string(),
    };
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_builder() {
        TransportError::Invalid(message)
    } else {
        TransportError::Connect(message)
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, TransportResult<HttpResponse>> {
        Box::pin(async move {
            debug!(method = %request.method, url = %request.url, "sending request");

            let mut builder = self
                .client
                .request(to_reqwest_method(request.method), &request.url)
                // Backstop; the client arms its own deadline as well
                .timeout(request.timeout + Duration::from_millis(100));

            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(map_error)?;

            let status = response.status().as_u16();
            let mut headers = Headers::new();
            for (name, value) in response.headers() {
                if let Ok(value) = value.to_str() {
                    headers.insert(header_name(name.as_str()), value.to_string());
                }
            }
            let body: Bytes = response.bytes().await.map_err(map_error)?;

            Ok(HttpResponse { status, headers, body })
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
