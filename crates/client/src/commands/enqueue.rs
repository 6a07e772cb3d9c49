// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ferry_core::{Destination, Method, OpId, OperationKind};

use crate::context::Context;
use crate::error::Result;

use super::parse_json;

pub fn run(
    ctx: &Context,
    kind: OperationKind,
    method: Method,
    endpoint: String,
    payload: Option<String>,
    max_retries: Option<u32>,
) -> Result<()> {
    let id = run_impl(ctx, kind, method, endpoint, payload, max_retries)?;
    println!("{}", id);
    Ok(())
}

pub(crate) fn run_impl(
    ctx: &Context,
    kind: OperationKind,
    method: Method,
    endpoint: String,
    payload: Option<String>,
    max_retries: Option<u32>,
) -> Result<OpId> {
    let payload = match payload {
        Some(raw) => parse_json(&raw)?,
        None => serde_json::Value::Null,
    };
    let destination = Destination::new(method, endpoint);
    let max_retries = max_retries.unwrap_or(ctx.config.max_retries);

    Ok(ctx.outbox.enqueue_with(kind, payload, destination, max_retries)?)
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
