// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ferry_core::Method;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::{HttpResponse, RequestConfig};

use super::parse_json;

pub async fn run(
    ctx: &Context,
    method: Method,
    endpoint: String,
    body: Option<String>,
    headers: Vec<(String, String)>,
    skip_auth: bool,
) -> Result<()> {
    let response = run_impl(ctx, method, endpoint, body, headers, skip_auth).await?;

    let text = response.text();
    if !text.is_empty() {
        println!("{}", text);
    }
    if !response.is_success() {
        return Err(Error::Status(response.status));
    }
    Ok(())
}

pub(crate) async fn run_impl(
    ctx: &Context,
    method: Method,
    endpoint: String,
    body: Option<String>,
    headers: Vec<(String, String)>,
    skip_auth: bool,
) -> Result<HttpResponse> {
    let mut config = RequestConfig::new(method, endpoint);
    if let Some(raw) = body {
        config = config.json(&parse_json(&raw)?)?;
    }
    for (name, value) in headers {
        config = config.header(&name, value);
    }
    if skip_auth {
        config = config.skip_auth();
    }

    Ok(ctx.client.execute(config).await?)
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
