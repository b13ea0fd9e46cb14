// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load(dir.path()).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.sync.drain_max_retries, 2);
    assert_eq!(config.sync.reconcile_max_retries, 3);
    assert_eq!(config.sync.base_delay_ms, 1000);
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.connectivity.health_path, "/notifications/health");
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("medsync.toml"),
        "[api]\nbase_url = \"http://localhost:3001/api\"\n\n[sync]\ndrain_max_retries = 5\n",
    )
    .unwrap();

    let config = Config::load(dir.path()).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:3001/api");
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.sync.drain_max_retries, 5);
    assert_eq!(config.sync.reconcile_max_retries, 3);
    assert_eq!(config.connectivity.probe_urls.len(), 3);
}

#[test]
fn save_then_load() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.sync.max_delay_ms = 5000;
    config.save(dir.path()).unwrap();

    assert_eq!(Config::load(dir.path()).unwrap(), config);
}

#[test]
fn malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("medsync.toml"), "[api\n").unwrap();

    let err = Config::load(dir.path()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn probe_timeout_is_capped() {
    let config = ConnectivityConfig {
        timeout_secs: 30,
        ..Default::default()
    };
    assert_eq!(config.timeout(), Duration::from_secs(5));
}

#[test]
fn data_paths_layout() {
    let paths = DataPaths::resolve(Some(PathBuf::from("/tmp/medsync-test"))).unwrap();
    assert_eq!(paths.db(), PathBuf::from("/tmp/medsync-test/records.db"));
    assert_eq!(paths.queue(), PathBuf::from("/tmp/medsync-test/sync_queue.jsonl"));
    assert_eq!(
        paths.notifications(),
        PathBuf::from("/tmp/medsync-test/notifications.jsonl")
    );
}
