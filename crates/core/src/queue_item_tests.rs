// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use serde_json::json;

#[test]
fn new_item_starts_without_retries() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    let item = SyncQueueItem::new(
        "sync_1_1".into(),
        SyncAction::Create,
        EntityType::Medication,
        "local_1_2",
        json!({"name": "Ibuprofeno"}),
        now,
    );
    assert_eq!(item.retry_count, 0);
    assert_eq!(item.target(), (EntityType::Medication, "local_1_2"));
}

#[test]
fn serializes_with_wire_names() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    let item = SyncQueueItem::new(
        "sync_1_1".into(),
        SyncAction::Archive,
        EntityType::Notification,
        "n1",
        Value::Null,
        now,
    );
    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["action"], "ARCHIVE");
    assert_eq!(value["entityType"], "notification");
    assert_eq!(value["targetId"], "n1");
    assert_eq!(value["retryCount"], 0);
}

#[test]
fn missing_retry_count_defaults_to_zero() {
    let line = r#"{"id":"sync_1_1","action":"DELETE","entityType":"treatment","targetId":"t1","enqueuedAt":"2026-03-01T08:00:00Z"}"#;
    let item: SyncQueueItem = serde_json::from_str(line).unwrap();
    assert_eq!(item.retry_count, 0);
    assert_eq!(item.data, Value::Null);
}
