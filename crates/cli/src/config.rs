// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is stored in `medsync.toml` inside the data directory and
//! includes:
//! - `[api]`: REST base URL and request timeout
//! - `[connectivity]`: probe URLs and the API health path
//! - `[sync]`: retry bounds and backoff for the queue and for in-line writes

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "medsync.toml";
const DB_FILE_NAME: &str = "records.db";
const QUEUE_FILE_NAME: &str = "sync_queue.jsonl";
const NOTIFICATIONS_FILE_NAME: &str = "notifications.jsonl";
const DRAIN_LOCK_NAME: &str = "drain.lock";
const DATA_DIR_ENV: &str = "MEDSYNC_DATA_DIR";

/// Client configuration stored in `medsync.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// REST API root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// URLs probed with HEAD; any success means online.
    #[serde(default = "default_probe_urls")]
    pub probe_urls: Vec<String>,
    /// Probe timeout in seconds (default: 5).
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
    /// Path under the API root answering the availability check.
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        ConnectivityConfig {
            probe_urls: default_probe_urls(),
            timeout_secs: default_probe_timeout_secs(),
            health_path: default_health_path(),
        }
    }
}

/// Retry and backoff settings.
///
/// The queue and the in-line write path keep separate bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Retries per queue item before it is dropped (default: 2).
    #[serde(default = "default_drain_max_retries")]
    pub drain_max_retries: u32,
    /// Total attempts for an in-line server write (default: 3).
    #[serde(default = "default_reconcile_max_retries")]
    pub reconcile_max_retries: u32,
    /// First backoff delay in milliseconds (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Backoff ceiling in milliseconds (default: 30000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            drain_max_retries: default_drain_max_retries(),
            reconcile_max_retries: default_reconcile_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.recuerdamed.org/api".to_string()
}

fn default_api_timeout_secs() -> u64 {
    10
}

fn default_probe_urls() -> Vec<String> {
    vec![
        "https://www.google.com".to_string(),
        "https://www.cloudflare.com".to_string(),
        "https://www.recuerdamed.org".to_string(),
    ]
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_health_path() -> String {
    "/notifications/health".to_string()
}

fn default_drain_max_retries() -> u32 {
    2
}

fn default_reconcile_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ConnectivityConfig {
    /// Probe timeout, never more than five seconds.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, 5))
    }
}

impl Config {
    /// Loads `medsync.toml` from `data_dir`, falling back to defaults when absent.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to `data_dir/medsync.toml`.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }
}

/// Locations of the persisted client state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataPaths { root: root.into() }
    }

    /// Resolves the data directory: explicit flag, then `MEDSYNC_DATA_DIR`,
    /// then the platform data dir.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = explicit {
            return Ok(DataPaths::new(dir));
        }
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(DataPaths::new(PathBuf::from(dir)));
        }
        dirs::data_local_dir()
            .map(|d| DataPaths::new(d.join("medsync")))
            .ok_or_else(|| {
                Error::Config(format!(
                    "cannot determine a data directory\n  hint: pass --data-dir or set {DATA_DIR_ENV}"
                ))
            })
    }

    pub fn config(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn db(&self) -> PathBuf {
        self.root.join(DB_FILE_NAME)
    }

    pub fn queue(&self) -> PathBuf {
        self.root.join(QUEUE_FILE_NAME)
    }

    pub fn notifications(&self) -> PathBuf {
        self.root.join(NOTIFICATIONS_FILE_NAME)
    }

    pub fn drain_lock(&self) -> PathBuf {
        self.root.join(DRAIN_LOCK_NAME)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
