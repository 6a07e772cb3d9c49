// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request and response values passed through the pipeline.

use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use ferry_core::Method;

use super::{HttpError, HttpResult};

/// Header map keyed by lowercase header name.
pub type Headers = BTreeMap<String, String>;

pub const AUTHORIZATION: &str = "authorization";
pub const CONTENT_TYPE: &str = "content-type";
pub const IDEMPOTENCY_KEY: &str = "idempotency-key";

const JSON: &str = "application/json";

/// Normalizes a header name for use as a [`Headers`] key.
pub fn header_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// What a caller asks the client to do.
///
/// The body is serialized when it is attached and never again; a retry
/// reuses the same bytes.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    /// Endpoint path joined onto the base URL, or an absolute http(s) URL.
    pub endpoint: String,
    pub body: Option<Bytes>,
    /// Per-call header overrides.
    pub headers: Headers,
    /// Skip credential attachment and the refresh-on-401 protocol.
    pub skip_auth: bool,
    /// Overrides the client's default timeout.
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        RequestConfig {
            method,
            endpoint: endpoint.into(),
            body: None,
            headers: Headers::new(),
            skip_auth: false,
            timeout: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Post, endpoint)
    }

    /// Serializes `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Validation`] if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> HttpResult<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| HttpError::Validation(format!("request body: {}", e)))?;
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(header_name(name), value.into());
        self
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A fully resolved outgoing request, as seen by interceptors and transports.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Bytes>,
    pub timeout: Duration,
    pub skip_auth: bool,
    /// Generation of the credential attached to this request, if any.
    pub credential_generation: Option<u64>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&header_name(name)).map(String::as_str)
    }
}

/// A response from the remote side.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        HttpResponse { status, headers: Headers::new(), body: body.into() }
    }

    /// A response with a JSON body.
    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        let mut response = HttpResponse::new(status, value.to_string());
        response.headers.insert(CONTENT_TYPE.to_string(), JSON.to_string());
        response
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&header_name(name)).map(String::as_str)
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> HttpResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| HttpError::Decode(format!("response body: {}", e)))
    }

    /// Body as (lossy) UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Joins an endpoint onto a base URL and validates the result.
pub fn resolve_url(base_url: &str, endpoint: &str) -> HttpResult<String> {
    if endpoint.trim().is_empty() {
        return Err(HttpError::Validation("endpoint must not be empty".to_string()));
    }

    let joined = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), endpoint.trim_start_matches('/'))
    };

    url::Url::parse(&joined)
        .map_err(|e| HttpError::Validation(format!("invalid url '{}': {}", joined, e)))?;

    Ok(joined)
}

/// Builds the outgoing request from defaults and per-call settings.
///
/// Merge order is defaults < per-call overrides; interceptors run afterwards
/// and win over both.
pub(crate) fn build_request(
    config: &RequestConfig,
    body: Option<Bytes>,
    base_url: &str,
    default_headers: &Headers,
    default_timeout: Duration,
) -> HttpResult<HttpRequest> {
    let url = resolve_url(base_url, &config.endpoint)?;

    let mut headers: Headers = default_headers
        .iter()
        .map(|(name, value)| (header_name(name), value.clone()))
        .collect();
    if body.is_some() {
        headers.entry(CONTENT_TYPE.to_string()).or_insert_with(|| JSON.to_string());
    }
    for (name, value) in &config.headers {
        headers.insert(header_name(name), value.clone());
    }

    Ok(HttpRequest {
        method: config.method,
        url,
        headers,
        body,
        timeout: config.timeout.unwrap_or(default_timeout),
        skip_auth: config.skip_auth,
        credential_generation: None,
    })
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
