// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use medsync_core::{EntityType, Notification, SyncAction};
use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::sync::test_helpers::{harness, Harness, MockGateway, USER};

const DAY_MS: u64 = 86_400_000;

fn services(h: &Harness) -> SyncServices {
    SyncServices::from_context(Config::default(), h.ctx.clone())
}

fn cached(id: &str) -> Notification {
    serde_json::from_value(json!({
        "id": id,
        "userId": USER,
        "type": "SYSTEM",
        "title": "t",
        "message": "m",
        "status": "READ",
        "createdAt": "2026-03-01T07:00:00.000Z",
        "updatedAt": "2026-03-01T07:00:00.000Z",
    }))
    .unwrap()
}

#[test]
fn open_creates_state_under_data_dir() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path());

    let services = SyncServices::open(Config::default(), &paths, Session::new(None)).unwrap();

    assert!(!services.session().has_token());
    assert_eq!(services.config().sync.drain_max_retries, 2);
    assert!(paths.db().exists());
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let h = harness(MockGateway::echo());
    h.seed_synced(EntityType::Medication, json!({"id": "m1"})).await;
    let services = services(&h);

    services.init().await.unwrap();
    services.init().await.unwrap();

    assert_eq!(h.ctx.store.lock().await.len(), 1);
}

#[tokio::test]
async fn test_status_counts_pending_items_per_entity() {
    let h = harness(MockGateway::echo());
    h.seed_synced(EntityType::Medication, json!({"id": "m1"})).await;
    h.enqueue(SyncAction::Update, EntityType::Medication, "m1", json!({}))
        .await;
    h.enqueue(SyncAction::Delete, EntityType::Medication, "m2", json!(null))
        .await;
    h.enqueue(SyncAction::Read, EntityType::Notification, "n1", json!({"id": "n1"}))
        .await;

    let report = services(&h).status().await.unwrap();

    assert!(report.online);
    assert!(report.api_available);
    assert!(report.signed_in);
    assert_eq!(report.pending, 3);
    assert_eq!(report.pending_by_entity.get("medication"), Some(&2));
    assert_eq!(report.pending_by_entity.get("notification"), Some(&1));
    assert_eq!(report.records, 1);
    assert!(!report.degraded);
}

#[tokio::test]
async fn test_status_offline_skips_api_check() {
    let h = harness(MockGateway::echo()).offline();

    let report = services(&h).status().await.unwrap();

    assert!(!report.online);
    assert!(!report.api_available);
    assert_eq!(h.connectivity.probes(), 1);
    assert_eq!(h.gateway.count(), 0);
}

#[tokio::test]
async fn test_cleanup_keeps_unsynced_data() {
    let h = harness(MockGateway::echo());
    h.seed_synced(EntityType::Medication, json!({"id": "m1"})).await;
    h.seed_local(EntityType::Medication, "local_1_1", json!({})).await;
    {
        let mut cache = h.ctx.notifications.lock().await;
        cache.upsert(cached("n1")).unwrap();
        cache.upsert(cached("local_1_2")).unwrap();
    }
    h.clock.advance(31 * DAY_MS);

    let report = services(&h).cleanup(30).await.unwrap();

    assert_eq!(report, CleanupReport { records: 1, notifications: 1 });
    assert!(h.record(EntityType::Medication, "m1").await.is_none());
    assert!(h.record(EntityType::Medication, "local_1_1").await.is_some());
    assert!(h.ctx.notifications.lock().await.get("local_1_2").is_some());
}

#[tokio::test]
async fn test_cleanup_of_recent_data_removes_nothing() {
    let h = harness(MockGateway::echo());
    h.seed_synced(EntityType::Appointment, json!({"id": "a1"})).await;

    let report = services(&h).cleanup(30).await.unwrap();

    assert_eq!(report, CleanupReport { records: 0, notifications: 0 });
    assert_eq!(h.ctx.store.lock().await.len(), 1);
}
