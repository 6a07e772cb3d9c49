// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::Context;
use crate::error::Result;

use super::parse_json;

pub async fn login(ctx: &Context, body: &str) -> Result<()> {
    let credentials = parse_json(body)?;
    ctx.session.login(&credentials).await?;
    println!("logged in");
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    ctx.session.logout().await?;
    println!("logged out");
    Ok(())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
