// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::ManualClock;
use yare::parameterized;

#[test]
fn local_record_id_has_prefix_and_timestamp() {
    let clock = ManualClock::new(1_712_345_678_901);
    let id = local_record_id(&clock);
    assert!(id.starts_with("local_1712345678901_"));
    assert!(is_local_id(&id));
}

#[test]
fn queue_item_id_is_not_a_local_record_id() {
    let clock = ManualClock::new(1_000);
    let id = queue_item_id(&clock);
    assert!(id.starts_with("sync_1000_"));
    assert!(!is_local_id(&id));
}

#[test]
fn ids_in_same_millisecond_usually_differ() {
    let clock = ManualClock::new(5);
    let ids: std::collections::HashSet<String> =
        (0..20).map(|_| local_record_id(&clock)).collect();
    assert!(ids.len() > 1);
}

#[parameterized(
    server_uuid = { "9f1c2e4a-0b1d-4c3e-8f00-123456789abc", false },
    server_short = { "srv_1", false },
    missing_suffix = { "local_123", false },
    extra_part = { "local_1_2_3", false },
    letters = { "local_12a_34", false },
    valid = { "local_1712345678901_42", true },
)]
fn is_local_id_cases(id: &str, expected: bool) {
    assert_eq!(is_local_id(id), expected);
}
