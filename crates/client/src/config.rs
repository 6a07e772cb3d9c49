// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Stored as TOML (default `~/.config/ferry/ferry.toml`). Every field is
//! optional; missing fields take the defaults below.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env;
use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "ferry.toml";
const APP_DIR_NAME: &str = "ferry";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base destination every endpoint is joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Default per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Seconds between periodic sync passes.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    /// Default retry budget for queued operations.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Default TTL for `cache put`.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Connectivity probe period in milliseconds. 0 = disabled.
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
    /// Endpoint probed for connectivity.
    #[serde(default = "default_health_endpoint")]
    pub health_endpoint: String,
    /// Directory for persisted state. Defaults to the XDG state dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    #[serde(default)]
    pub auth: AuthEndpoints,
    /// Default headers, lowest merge precedence.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// Reserved session endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthEndpoints {
    #[serde(default = "default_login")]
    pub login: String,
    #[serde(default = "default_refresh")]
    pub refresh: String,
    #[serde(default = "default_logout")]
    pub logout: String,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_sync_interval_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_probe_interval_ms() -> u64 {
    15_000
}

fn default_health_endpoint() -> String {
    "/health".to_string()
}

fn default_login() -> String {
    "/auth/login".to_string()
}

fn default_refresh() -> String {
    "/auth/refresh".to_string()
}

fn default_logout() -> String {
    "/auth/logout".to_string()
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        AuthEndpoints { login: default_login(), refresh: default_refresh(), logout: default_logout() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            sync_interval_secs: default_sync_interval_secs(),
            max_retries: default_max_retries(),
            cache_ttl_secs: default_cache_ttl_secs(),
            probe_interval_ms: default_probe_interval_ms(),
            health_endpoint: default_health_endpoint(),
            state_dir: None,
            auth: AuthEndpoints::default(),
            headers: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Saves configuration as pretty TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Rejects settings the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base_url '{}': {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "invalid base_url '{}': must be http:// or https://",
                self.base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be greater than 0".to_string()));
        }
        if self.sync_interval_secs == 0 {
            return Err(Error::Config("sync_interval_secs must be greater than 0".to_string()));
        }
        if self.max_retries == 0 {
            return Err(Error::Config("max_retries must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Probe period, or `None` when probing is disabled.
    pub fn probe_interval(&self) -> Option<Duration> {
        (self.probe_interval_ms > 0).then(|| Duration::from_millis(self.probe_interval_ms))
    }

    /// Directory for persisted state: config, then `FERRY_STATE_DIR`, then
    /// the platform default.
    pub fn resolve_state_dir(&self) -> Result<PathBuf> {
        self.state_dir
            .clone()
            .or_else(env::state_dir)
            .or_else(default_state_dir)
            .ok_or(Error::NoStateDir)
    }
}

/// Platform state directory for ferry (`$XDG_STATE_HOME/ferry` on Linux).
pub fn default_state_dir() -> Option<PathBuf> {
    dirs::state_dir().or_else(dirs::data_local_dir).map(|dir| dir.join(APP_DIR_NAME))
}

/// Config file location: `FERRY_CONFIG`, else the platform config dir.
pub fn default_config_path() -> Option<PathBuf> {
    env::config_path()
        .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
