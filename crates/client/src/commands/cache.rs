// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use crate::cli::CacheCommand;
use crate::context::Context;
use crate::error::{Error, Result};

use super::parse_json;

pub fn run(ctx: &Context, command: CacheCommand) -> Result<()> {
    match command {
        CacheCommand::Get { key } => {
            let value = get(ctx, &key)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        CacheCommand::Put { key, value, ttl_secs } => {
            let ttl = ttl_secs.map(Duration::from_secs).unwrap_or_else(|| ctx.config.cache_ttl());
            ctx.cache.put(key, parse_json(&value)?, ttl)?;
        }
        CacheCommand::Remove { key } => {
            if !ctx.cache.remove(&key)? {
                return Err(Error::CacheMiss(key));
            }
        }
        CacheCommand::Purge => {
            let purged = ctx.cache.purge_expired()?;
            println!("purged {} expired entries", purged);
        }
    }
    Ok(())
}

pub(crate) fn get(ctx: &Context, key: &str) -> Result<serde_json::Value> {
    ctx.cache.get(key).ok_or_else(|| Error::CacheMiss(key.to_string()))
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
