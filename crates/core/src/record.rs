// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The generic record envelope stored for every entity type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{EntityType, SyncStatus};
use crate::error::{Error, Result};

/// A persisted entity tracked by the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique within `entity_type`. Server ids are opaque; local ids start with `local_`.
    pub id: String,
    pub entity_type: EntityType,
    /// Owning patient profile (or user, for notifications).
    pub owner_id: String,
    /// Entity-specific fields, kept as the server's JSON object.
    pub payload: Value,
    pub sync_status: SyncStatus,
    /// True while the record exists only on this device.
    pub is_offline: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Wraps a record returned by the server.
    ///
    /// The payload must carry an `id`; timestamps fall back to `now` when the
    /// server omits them.
    pub fn from_server(
        entity_type: EntityType,
        owner_id: &str,
        payload: Value,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let id = payload_id(&payload).ok_or(Error::FieldRequired { field: "id" })?;
        let owner_id = payload
            .get(entity_type.owner_field())
            .and_then(Value::as_str)
            .unwrap_or(owner_id)
            .to_string();
        let created_at = payload_timestamp(&payload, "createdAt").unwrap_or(now);
        let updated_at = payload_timestamp(&payload, "updatedAt").unwrap_or(now);

        Ok(Record {
            id,
            entity_type,
            owner_id,
            payload,
            sync_status: SyncStatus::Synced,
            is_offline: false,
            created_at,
            updated_at,
        })
    }

    /// Creates a record that has not reached the server yet.
    pub fn local(
        entity_type: EntityType,
        id: String,
        owner_id: &str,
        mut payload: Value,
        now: DateTime<Utc>,
    ) -> Self {
        if let Value::Object(map) = &mut payload {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        Record {
            id,
            entity_type,
            owner_id: owner_id.to_string(),
            payload,
            sync_status: SyncStatus::Pending,
            is_offline: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Server confirmed the record: `synced` and no longer offline, together.
    pub fn mark_synced(&mut self, now: DateTime<Utc>) {
        self.sync_status = SyncStatus::Synced;
        self.is_offline = false;
        self.updated_at = now;
    }

    /// Retries exhausted; the record stays offline so it remains visibly unconfirmed.
    pub fn mark_failed(&mut self, now: DateTime<Utc>) {
        self.sync_status = SyncStatus::Failed;
        self.updated_at = now;
    }

    /// Reads a string field from the payload.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.payload.get(name).and_then(Value::as_str)
    }

    /// Merges `patch` into the payload, keeping the record id.
    pub fn apply_patch(&mut self, patch: &Value, now: DateTime<Utc>) {
        if let (Value::Object(target), Value::Object(source)) = (&mut self.payload, patch) {
            for (key, value) in source {
                if key != "id" {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        self.updated_at = now;
    }
}

/// Extracts an `id` from a JSON object, accepting string or numeric ids.
pub fn payload_id(payload: &Value) -> Option<String> {
    match payload.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn payload_timestamp(payload: &Value, field: &str) -> Option<DateTime<Utc>> {
    let raw = payload.get(field)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
