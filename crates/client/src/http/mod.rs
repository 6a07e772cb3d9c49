// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client with an ordered interceptor pipeline.
//!
//! # Architecture
//!
//! ```text
//!  RequestConfig
//!       │  build (defaults < per-call headers)
//!       ▼
//! ┌──────────────────────┐
//! │ request interceptors │  (AuthInterceptor attaches the bearer token)
//! └──────────────────────┘
//!       │
//!       ▼
//! ┌──────────────────────┐     ┌─────────────┐
//! │ timeout-armed send   │────►│  Transport  │  (reqwest, or a mock)
//! └──────────────────────┘◄────└─────────────┘
//!       │
//!       ▼
//! ┌──────────────────────┐
//! │ response interceptors│  (RefreshOn401Interceptor: refresh, replay once)
//! └──────────────────────┘
//! ```

mod client;
mod interceptor;
mod transport;
mod types;

use std::future::Future;
use std::pin::Pin;

pub use client::{HttpClient, HttpClientBuilder};
pub use interceptor::{
    AuthInterceptor, Exchange, RefreshOn401Interceptor, RequestInterceptor, ResponseInterceptor,
};
pub use transport::{HttpTransport, ReqwestTransport, TransportError, TransportResult};
pub use types::{
    header_name, resolve_url, Headers, HttpRequest, HttpResponse, RequestConfig, AUTHORIZATION,
    CONTENT_TYPE, IDEMPOTENCY_KEY,
};

/// Boxed, sendable future used at the trait seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type for HTTP client operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpError {
    /// Timeout or connectivity failure. Retryable later, never retried inside
    /// a single `execute` call.
    #[error("transient network error: {0}")]
    Transient(TransportError),

    /// The request itself is malformed. Never retried.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// An interceptor asked to replay a request that was already replayed.
    #[error("request was already retried once")]
    RetryExhausted,
}

impl HttpError {
    pub fn is_transient(&self) -> bool {
        matches!(self, HttpError::Transient(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Transient(TransportError::Timeout))
    }
}

impl From<TransportError> for HttpError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Invalid(reason) => HttpError::Validation(reason),
            other => HttpError::Transient(other),
        }
    }
}

/// Result type for HTTP client operations.
pub type HttpResult<T> = Result<T, HttpError>;
