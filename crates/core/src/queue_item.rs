// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending server mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{EntityType, SyncAction};

/// One mutation waiting to be replayed against the server.
///
/// Items are replayed in `enqueued_at` order. `retry_count` only grows, and
/// only through the drainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncQueueItem {
    pub id: String,
    pub action: SyncAction,
    pub entity_type: EntityType,
    /// Id of the record the mutation applies to.
    pub target_id: String,
    /// Request body for CREATE/UPDATE; `Null` otherwise.
    #[serde(default)]
    pub data: Value,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default)]
    pub retry_count: u32,
}

impl SyncQueueItem {
    pub fn new(
        id: String,
        action: SyncAction,
        entity_type: EntityType,
        target_id: impl Into<String>,
        data: Value,
        now: DateTime<Utc>,
    ) -> Self {
        SyncQueueItem {
            id,
            action,
            entity_type,
            target_id: target_id.into(),
            data,
            enqueued_at: now,
            retry_count: 0,
        }
    }

    /// Key identifying the record this item mutates.
    pub fn target(&self) -> (EntityType, &str) {
        (self.entity_type, self.target_id.as_str())
    }
}

#[cfg(test)]
#[path = "queue_item_tests.rs"]
mod tests;
