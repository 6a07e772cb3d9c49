// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use ferry_core::{Method, OperationKind};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn parse_kind(s: &str) -> Result<OperationKind, String> {
    s.parse().map_err(|e: ferry_core::Error| e.to_string())
}

fn parse_method(s: &str) -> Result<Method, String> {
    s.parse().map_err(|e: ferry_core::Error| e.to_string())
}

/// Parse a `name:value` header argument.
fn parse_header(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected name:value, got '{}'", s)),
    }
}

#[derive(Parser)]
#[command(name = "ferry")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first HTTP client with a durable outbox")]
#[command(
    long_about = "Offline-first HTTP client with a durable outbox.\n\n\
    Mutations are queued locally and replayed with bounded retry once the server is reachable."
)]
pub struct Cli {
    /// Path to ferry.toml (default: $FERRY_CONFIG or the platform config dir)
    #[arg(short = 'c', long = "config", global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a default ferry.toml to the config path
    Init {
        /// Base destination to write instead of the default
        #[arg(long)]
        base_url: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Log in and store the session
    Login {
        /// JSON credentials posted to the login endpoint
        #[arg(long)]
        body: String,
    },

    /// Log out and clear the session
    Logout,

    /// Queue a mutation for delivery
    Enqueue {
        /// Operation kind (action, form-submission, api-call)
        #[arg(long, short, value_parser = parse_kind)]
        kind: OperationKind,

        /// HTTP method
        #[arg(long, short, value_parser = parse_method, default_value = "POST")]
        method: Method,

        /// Endpoint path (joined onto base_url)
        #[arg(long, short)]
        endpoint: String,

        /// JSON payload sent as the request body
        #[arg(long, short)]
        payload: Option<String>,

        /// Retry budget (default: max_retries from config)
        #[arg(long)]
        max_retries: Option<u32>,
    },

    /// List queued operations
    Pending {
        /// Only this kind
        #[arg(long, short, value_parser = parse_kind)]
        kind: Option<OperationKind>,

        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Check connectivity and run one sync pass
    Sync,

    /// Send one request through the client pipeline
    Request {
        #[arg(long, short, value_parser = parse_method, default_value = "GET")]
        method: Method,

        #[arg(long, short)]
        endpoint: String,

        /// JSON request body
        #[arg(long, short)]
        body: Option<String>,

        /// Extra header (name:value, repeatable)
        #[arg(long = "header", short = 'H', value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Do not attach credentials
        #[arg(long)]
        skip_auth: bool,
    },

    /// Read and write the content cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Run the probe and sync scheduler until interrupted
    Run,
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Print a cached value
    Get { key: String },

    /// Store a JSON value
    Put {
        key: String,

        /// JSON value
        value: String,

        /// Time to live (default: cache_ttl_secs from config)
        #[arg(long)]
        ttl_secs: Option<u64>,
    },

    /// Remove a cached value
    Remove { key: String },

    /// Drop every expired entry
    Purge,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
