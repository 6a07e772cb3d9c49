// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ferry - an offline-first resilient HTTP client layer.
//!
//! # Main Components
//!
//! - [`HttpClient`] - request execution through an ordered interceptor
//!   pipeline, with per-request timeouts and refresh-on-401
//! - [`TokenStore`] / [`Session`] - credential pair ownership, single-flight
//!   refresh, login and logout
//! - [`Outbox`] - durable per-kind FIFO queue of mutations
//! - [`SyncScheduler`] - replays the outbox periodically and on reconnect
//! - [`ConnectivityMonitor`] - online/offline state and transitions
//! - [`ContentCache`] - TTL cache for offline reads
//! - [`EventBus`] - typed notifications for everything that happens detached
//!   from a caller
//!
//! All of them are wired together by [`Context`]:
//!
//! ```rust,ignore
//! use ferry::{Config, Context};
//! use ferry_core::{Destination, Method, OperationKind};
//!
//! let ctx = Context::open(Config::load(path)?)?;
//! let id = ctx.outbox.enqueue(
//!     OperationKind::FormSubmission,
//!     serde_json::json!({"name": "Ada"}),
//!     Destination::new(Method::Post, "/forms/contact"),
//! )?;
//! ctx.scheduler.run_pass().await;
//! ```

pub mod auth;
pub mod cache;
mod cli;
mod commands;
pub mod config;
pub mod connectivity;
pub mod context;
pub mod env;
pub mod error;
pub mod events;
pub mod http;
pub mod logging;
pub mod outbox;
pub mod sync;

#[cfg(test)]
mod test_helpers;

pub use auth::{AuthError, Session, TokenStore};
pub use cache::ContentCache;
pub use cli::{CacheCommand, Cli, Command, OutputFormat};
pub use config::Config;
pub use connectivity::{ConnectivityMonitor, ConnectivityProbe};
pub use context::Context;
pub use error::{Error, Result};
pub use events::{Event, EventBus};
pub use http::{HttpClient, HttpError, RequestConfig};
pub use outbox::{FailureOutcome, Outbox, OutboxError};
pub use sync::{DeadLetterReport, PassOutcome, SyncReport, SyncScheduler};

/// Loads configuration for a command line invocation.
///
/// An explicit `--config` path must exist; the default location may be
/// absent, in which case defaults apply.
pub fn load_config(explicit: Option<&std::path::Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load(path),
        None => match config::default_config_path() {
            Some(path) => Config::load_or_default(&path),
            None => Ok(Config::default()),
        },
    }
}

/// Runs one command line invocation.
pub async fn run(cli: Cli) -> Result<()> {
    if let Command::Init { base_url, force } = cli.command {
        let path = match cli.config.or_else(config::default_config_path) {
            Some(path) => path,
            None => return Err(Error::Config("no config directory could be determined".into())),
        };
        return commands::init::run(&path, base_url, force);
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run => {
            let state_dir = config.resolve_state_dir()?;
            logging::setup(Some(&state_dir.join(logging::LOG_FILE_NAME)), "info");
        }
        _ => logging::setup(None, "warn"),
    }

    let ctx = Context::open(config)?;

    match cli.command {
        Command::Login { body } => commands::session::login(&ctx, &body).await,
        Command::Logout => commands::session::logout(&ctx).await,
        Command::Enqueue { kind, method, endpoint, payload, max_retries } => {
            commands::enqueue::run(&ctx, kind, method, endpoint, payload, max_retries)
        }
        Command::Pending { kind, output } => commands::pending::run(&ctx, kind, output),
        Command::Sync => commands::sync::run(&ctx).await,
        Command::Request { method, endpoint, body, headers, skip_auth } => {
            commands::request::run(&ctx, method, endpoint, body, headers, skip_auth).await
        }
        Command::Cache(command) => commands::cache::run(&ctx, command),
        Command::Run => commands::run::run(&ctx).await,
        Command::Init { .. } => Ok(()),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
