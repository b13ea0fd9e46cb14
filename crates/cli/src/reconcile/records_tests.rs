// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for merged reads and queued writes of generic records.

#![allow(clippy::unwrap_used)]

use medsync_core::id::is_local_id;
use medsync_core::{EntityType, SyncAction, SyncStatus};
use serde_json::json;
use yare::parameterized;

use super::Reconciler;
use crate::error::Error;
use crate::sync::test_helpers::{backoff, harness, Harness, MockGateway, PROFILE};
use crate::sync::{ApiResponse, Drainer, GatewayError, Method};

fn reconciler(h: &Harness) -> Reconciler {
    Reconciler::new(h.ctx.clone(), backoff(), 3)
}

fn listing(body: serde_json::Value) -> MockGateway {
    MockGateway::new(move |_| Ok(ApiResponse::new(200, Some(body.clone()))))
}

#[tokio::test]
async fn test_server_copy_replaces_stale_local_copy() {
    let h = harness(listing(json!([{"id": "m1", "name": "fresh"}])));
    h.seed_synced(EntityType::Medication, json!({"id": "m1", "name": "stale"}))
        .await;

    let records = reconciler(&h)
        .get_records(EntityType::Medication, PROFILE)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].field_str("name"), Some("fresh"));
    let stored = h.record(EntityType::Medication, "m1").await.unwrap();
    assert_eq!(stored.field_str("name"), Some("fresh"));
    assert_eq!(stored.sync_status, SyncStatus::Synced);
}

#[tokio::test]
async fn test_merge_adds_device_only_records() {
    let h = harness(listing(json!({"items": [{"id": "m1"}]})));
    h.seed_local(EntityType::Medication, "local_1_1", json!({"name": "new"}))
        .await;
    h.seed_synced(EntityType::Medication, json!({"id": "gone"})).await;

    let records = reconciler(&h)
        .get_records(EntityType::Medication, PROFILE)
        .await
        .unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "local_1_1"]);
    let request = &h.gateway.requests()[0];
    assert_eq!(request.path, "/medications");
    assert_eq!(
        request.query,
        vec![("patientProfileId".to_string(), PROFILE.to_string())]
    );
}

#[parameterized(
    not_found = { Err(GatewayError::NotFound) },
    empty_body = { Ok(ApiResponse::new(204, None)) },
)]
fn server_without_content_leaves_offline_records(answer: Result<ApiResponse, GatewayError>) {
    tokio::runtime::Runtime::new().unwrap().block_on(async {
        let h = harness(MockGateway::new(move |_| answer.clone()));
        h.seed_local(EntityType::Treatment, "local_1_1", json!({})).await;
        h.seed_synced(EntityType::Treatment, json!({"id": "t1"})).await;

        let records = reconciler(&h)
            .get_records(EntityType::Treatment, PROFILE)
            .await
            .unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["local_1_1"]);
    });
}

#[tokio::test]
async fn test_fetch_error_serves_whole_local_store() {
    let h = harness(MockGateway::failing(GatewayError::Server { status: 502 }));
    h.seed_local(EntityType::Appointment, "local_1_1", json!({})).await;
    h.seed_synced(EntityType::Appointment, json!({"id": "a1"})).await;

    let records = reconciler(&h)
        .get_records(EntityType::Appointment, PROFILE)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_offline_read_makes_no_request() {
    let h = harness(listing(json!([{"id": "m9"}]))).offline();
    h.seed_synced(EntityType::Medication, json!({"id": "m1"})).await;

    let records = reconciler(&h)
        .get_records(EntityType::Medication, PROFILE)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "m1");
    assert_eq!(h.gateway.count(), 0);
}

#[parameterized(
    medication = { EntityType::Medication },
    appointment = { EntityType::Appointment },
    treatment = { EntityType::Treatment },
    note = { EntityType::Note },
)]
fn offline_create_is_stored_and_queued(entity: EntityType) {
    tokio::runtime::Runtime::new().unwrap().block_on(async {
        let h = harness(MockGateway::echo()).offline();

        let record = reconciler(&h)
            .create_record(entity, PROFILE, json!({"name": "Ibuprofeno"}))
            .await
            .unwrap();

        assert!(is_local_id(&record.id));
        assert!(record.is_offline);
        assert_eq!(record.entity_type, entity);
        assert_eq!(record.sync_status, SyncStatus::Pending);
        assert_eq!(record.field_str("patientProfileId"), Some(PROFILE));
        let queued = h.queued().await;
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].action, SyncAction::Create);
        assert_eq!(queued[0].entity_type, entity);
        assert_eq!(queued[0].target_id, record.id);
        assert_eq!(h.gateway.count(), 0);
    });
}

#[parameterized(
    medication = { EntityType::Medication, "/medications" },
    appointment = { EntityType::Appointment, "/appointments" },
    treatment = { EntityType::Treatment, "/treatments" },
    note = { EntityType::Note, "/notes" },
)]
fn queued_create_drains_to_entity_resource(entity: EntityType, resource: &str) {
    tokio::runtime::Runtime::new().unwrap().block_on(async {
        let h = harness(MockGateway::echo()).offline();
        let record = reconciler(&h)
            .create_record(entity, PROFILE, json!({"title": "Control"}))
            .await
            .unwrap();

        h.connectivity.set_online(true);
        Drainer::new(h.ctx.clone(), backoff(), 3).drain().await.unwrap();

        let requests = h.gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, resource);
        assert!(h.record(entity, &record.id).await.is_none());
        let synced = h.record(entity, "srv-1").await.unwrap();
        assert_eq!(synced.sync_status, SyncStatus::Synced);
        assert!(h.queued().await.is_empty());
    });
}

#[tokio::test]
async fn test_online_create_is_synced_immediately() {
    let h = harness(MockGateway::echo());

    let record = reconciler(&h)
        .create_record(EntityType::Appointment, PROFILE, json!({"title": "Dentist"}))
        .await
        .unwrap();

    assert_eq!(record.id, "srv-1");
    assert_eq!(record.sync_status, SyncStatus::Synced);
    assert!(h.queued().await.is_empty());
    assert!(h.record(EntityType::Appointment, "srv-1").await.is_some());
}

#[tokio::test]
async fn test_unreachable_server_falls_back_to_queue_after_retries() {
    let h = harness(MockGateway::failing(GatewayError::Timeout));

    let record = reconciler(&h)
        .create_record(EntityType::Treatment, PROFILE, json!({"name": "Fisio"}))
        .await
        .unwrap();

    assert!(is_local_id(&record.id));
    assert_eq!(h.gateway.count(), 3);
    assert_eq!(h.delay.millis(), vec![1000, 2000]);
    assert_eq!(h.queued().await.len(), 1);
}

#[tokio::test]
async fn test_rejected_create_surfaces_and_stores_nothing() {
    let h = harness(MockGateway::failing(GatewayError::Rejected {
        status: 422,
        message: "name is required".into(),
    }));

    let err = reconciler(&h)
        .create_record(EntityType::Medication, PROFILE, json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Rejected { status: 422, .. }));
    assert!(h.ctx.store.lock().await.is_empty());
    assert!(h.queued().await.is_empty());
}

#[parameterized(
    intake = { EntityType::IntakeEvent },
    notification = { EntityType::Notification },
)]
fn generic_create_refuses_other_entities(entity: EntityType) {
    tokio::runtime::Runtime::new().unwrap().block_on(async {
        let h = harness(MockGateway::echo());
        let err = reconciler(&h)
            .create_record(entity, PROFILE, json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    });
}

#[tokio::test]
async fn test_update_of_unsynced_record_is_queued() {
    let h = harness(MockGateway::echo());
    h.seed_local(EntityType::Medication, "local_1_1", json!({"dose": "200mg"}))
        .await;

    let record = reconciler(&h)
        .update_record(EntityType::Medication, "local_1_1", json!({"dose": "400mg"}))
        .await
        .unwrap();

    assert_eq!(record.field_str("dose"), Some("400mg"));
    assert_eq!(h.gateway.count(), 0);
    assert_eq!(h.queued().await[0].action, SyncAction::Update);
}

#[tokio::test]
async fn test_online_update_patches_server_record() {
    let h = harness(MockGateway::echo());
    h.seed_synced(EntityType::Medication, json!({"id": "m1", "dose": "200mg"}))
        .await;

    let record = reconciler(&h)
        .update_record(EntityType::Medication, "m1", json!({"dose": "400mg"}))
        .await
        .unwrap();

    assert_eq!(record.sync_status, SyncStatus::Synced);
    assert_eq!(record.field_str("dose"), Some("400mg"));
    let request = &h.gateway.requests()[0];
    assert_eq!(request.method, Method::Patch);
    assert_eq!(request.path, "/medications/m1");
}

#[tokio::test]
async fn test_update_waits_behind_queued_mutations() {
    let h = harness(MockGateway::echo());
    h.seed_synced(EntityType::Medication, json!({"id": "m1"})).await;
    h.enqueue(SyncAction::Update, EntityType::Medication, "m1", json!({"a": 1}))
        .await;

    reconciler(&h)
        .update_record(EntityType::Medication, "m1", json!({"a": 2}))
        .await
        .unwrap();

    assert_eq!(h.gateway.count(), 0);
    assert_eq!(h.queued().await.len(), 2);
}

#[tokio::test]
async fn test_update_of_missing_record_is_not_found() {
    let h = harness(MockGateway::echo());

    let err = reconciler(&h)
        .update_record(EntityType::Medication, "nope", json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_deleting_unsynced_record_drops_its_queue_items() {
    let h = harness(MockGateway::echo()).offline();
    let engine = reconciler(&h);
    let record = engine
        .create_record(EntityType::Medication, PROFILE, json!({"name": "x"}))
        .await
        .unwrap();

    engine
        .delete_record(EntityType::Medication, &record.id)
        .await
        .unwrap();

    assert!(h.record(EntityType::Medication, &record.id).await.is_none());
    assert!(h.queued().await.is_empty());
    assert_eq!(h.gateway.count(), 0);
}

#[tokio::test]
async fn test_offline_delete_is_queued() {
    let h = harness(MockGateway::echo()).offline();
    h.seed_synced(EntityType::Appointment, json!({"id": "a1"})).await;

    reconciler(&h)
        .delete_record(EntityType::Appointment, "a1")
        .await
        .unwrap();

    assert!(h.record(EntityType::Appointment, "a1").await.is_none());
    let queued = h.queued().await;
    assert_eq!(queued[0].action, SyncAction::Delete);
    assert_eq!(queued[0].target_id, "a1");
}

#[tokio::test]
async fn test_offline_create_reaches_server_on_next_drain() {
    let h = harness(MockGateway::echo()).offline();
    let record = reconciler(&h)
        .create_record(EntityType::Medication, PROFILE, json!({"name": "Ibuprofeno"}))
        .await
        .unwrap();

    h.connectivity.set_online(true);
    let report = Drainer::new(h.ctx.clone(), backoff(), 2)
        .drain()
        .await
        .unwrap();

    assert_eq!(report.synced, 1);
    assert!(h.record(EntityType::Medication, &record.id).await.is_none());
    let synced = h.record(EntityType::Medication, "srv-1").await.unwrap();
    assert!(!synced.is_offline);
    assert_eq!(synced.field_str("name"), Some("Ibuprofeno"));
    assert_eq!(h.gateway.count_method(Method::Post), 1);
}
