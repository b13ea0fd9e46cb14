// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the sync queue.

#![allow(clippy::unwrap_used)]

use super::queue::{QueueError, SyncQueue};
use super::test_helpers::t0;
use medsync_core::{EntityType, SyncAction};
use serde_json::json;
use tempfile::tempdir;

fn enqueue(queue: &mut SyncQueue, id: &str, target: &str) {
    queue
        .enqueue(
            id.to_string(),
            SyncAction::Create,
            EntityType::Medication,
            target,
            json!({"name": target}),
            t0(),
        )
        .unwrap();
}

#[test]
fn test_enqueue_persists_immediately() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sync_queue.jsonl");

    let mut queue = SyncQueue::open(&path).unwrap();
    enqueue(&mut queue, "sync_1_1", "local_1_1");

    let reopened = SyncQueue::open(&path).unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.snapshot()[0].target_id, "local_1_1");
    assert_eq!(reopened.snapshot()[0].retry_count, 0);
}

#[test]
fn test_snapshot_keeps_insertion_order() {
    let mut queue = SyncQueue::in_memory();
    enqueue(&mut queue, "sync_1_1", "a");
    enqueue(&mut queue, "sync_1_2", "b");
    enqueue(&mut queue, "sync_1_3", "c");

    let ids: Vec<_> = queue.snapshot().into_iter().map(|i| i.id).collect();
    assert_eq!(ids, vec!["sync_1_1", "sync_1_2", "sync_1_3"]);
}

#[test]
fn test_remove_rewrites_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sync_queue.jsonl");
    let mut queue = SyncQueue::open(&path).unwrap();
    enqueue(&mut queue, "sync_1_1", "a");
    enqueue(&mut queue, "sync_1_2", "b");

    assert!(queue.remove("sync_1_1").unwrap());
    assert!(!queue.remove("sync_1_1").unwrap());

    let reopened = SyncQueue::open(&path).unwrap();
    assert_eq!(reopened.len(), 1);
    assert!(reopened.get("sync_1_2").is_some());
}

#[test]
fn test_set_retry_count_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sync_queue.jsonl");
    let mut queue = SyncQueue::open(&path).unwrap();
    enqueue(&mut queue, "sync_1_1", "a");

    queue.set_retry_count("sync_1_1", 2).unwrap();

    let reopened = SyncQueue::open(&path).unwrap();
    assert_eq!(reopened.get("sync_1_1").unwrap().retry_count, 2);
}

#[test]
fn test_set_retry_count_unknown_item() {
    let mut queue = SyncQueue::in_memory();
    let err = queue.set_retry_count("nope", 1).unwrap_err();
    assert!(matches!(err, QueueError::NotFound(_)));
}

#[test]
fn test_retarget_and_remove_for() {
    let mut queue = SyncQueue::in_memory();
    enqueue(&mut queue, "sync_1_1", "local_1_1");
    enqueue(&mut queue, "sync_1_2", "local_1_1");
    enqueue(&mut queue, "sync_1_3", "other");

    assert_eq!(queue.retarget(EntityType::Medication, "local_1_1", "srv_1").unwrap(), 2);
    assert_eq!(queue.items_for(EntityType::Medication, "srv_1").len(), 2);

    assert_eq!(queue.remove_for(EntityType::Medication, "srv_1").unwrap(), 2);
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_reload_sees_other_writers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sync_queue.jsonl");
    let mut first = SyncQueue::open(&path).unwrap();
    let mut second = SyncQueue::open(&path).unwrap();

    enqueue(&mut second, "sync_1_1", "a");
    assert!(first.is_empty());

    first.reload().unwrap();
    assert_eq!(first.len(), 1);
}

#[test]
fn test_clear() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sync_queue.jsonl");
    let mut queue = SyncQueue::open(&path).unwrap();
    enqueue(&mut queue, "sync_1_1", "a");

    queue.clear().unwrap();

    assert!(queue.is_empty());
    assert!(SyncQueue::open(&path).unwrap().is_empty());
}

#[test]
fn test_remove_keeps_items_enqueued_by_another_handle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sync_queue.jsonl");
    let mut drainer = SyncQueue::open(&path).unwrap();
    enqueue(&mut drainer, "sync_1_1", "a");
    let mut writer = SyncQueue::open(&path).unwrap();
    enqueue(&mut writer, "sync_1_2", "b");

    assert!(drainer.remove("sync_1_1").unwrap());
    drainer.set_retry_count("sync_1_2", 1).unwrap();

    let ids: Vec<_> = drainer.snapshot().into_iter().map(|i| i.id).collect();
    assert_eq!(ids, vec!["sync_1_2"]);
    let on_disk = SyncQueue::open(&path).unwrap().snapshot();
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk[0].id, "sync_1_2");
    assert_eq!(on_disk[0].retry_count, 1);
}

#[test]
fn test_retarget_reaches_items_enqueued_by_another_handle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sync_queue.jsonl");
    let mut drainer = SyncQueue::open(&path).unwrap();
    let mut writer = SyncQueue::open(&path).unwrap();
    enqueue(&mut writer, "sync_1_1", "local_1_1");

    assert_eq!(
        drainer
            .retarget(EntityType::Medication, "local_1_1", "srv-1")
            .unwrap(),
        1
    );
    assert_eq!(
        SyncQueue::open(&path).unwrap().snapshot()[0].target_id,
        "srv-1"
    );
}
