// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! REST endpoint paths and the queue-action dispatch table.

use medsync_core::id::is_local_id;
use medsync_core::{EntityType, SyncAction, SyncQueueItem};
use serde_json::{json, Value};

use super::gateway::ApiRequest;

pub const NOTIFICATION_ITEM: &str = "/notifications/:id";
pub const NOTIFICATION_READ: &str = "/notifications/:id/read";
pub const NOTIFICATION_ARCHIVE: &str = "/notifications/:id/archive";
pub const NOTIFICATION_STATS: &str = "/notifications/stats";
pub const NOTIFICATION_BULK_READ: &str = "/notifications/bulk/read";
pub const NOTIFICATION_CLEANUP: &str = "/notifications/cleanup/old";

/// Substitutes `:id` in a path template.
pub fn with_id(template: &str, id: &str) -> String {
    template.replace(":id", id)
}

/// `/{resource}/{id}`.
pub fn item_path(entity: EntityType, id: &str) -> String {
    format!("{}/{}", entity.resource(), id)
}

/// `GET /{resource}?{ownerField}={owner}`.
pub fn list_request(entity: EntityType, owner_id: &str) -> ApiRequest {
    ApiRequest::get(entity.resource()).with_query(entity.owner_field(), owner_id)
}

/// Maps a queued mutation onto its endpoint.
///
/// | action  | request                    |
/// |---------|----------------------------|
/// | CREATE  | `POST /{resource}`         |
/// | UPDATE  | `PATCH /{resource}/:id`    |
/// | DELETE  | `DELETE /{resource}/:id`   |
/// | READ    | `PATCH /{resource}/:id/read` |
/// | ARCHIVE | `PATCH /{resource}/:id/archive` |
pub fn dispatch(item: &SyncQueueItem, token: Option<&str>) -> ApiRequest {
    let entity = item.entity_type;
    let id = item.target_id.as_str();
    let request = match item.action {
        SyncAction::Create => ApiRequest::post(entity.resource(), create_body(&item.data)),
        SyncAction::Update => ApiRequest::patch(item_path(entity, id), Some(item.data.clone())),
        SyncAction::Delete => ApiRequest::delete(item_path(entity, id)),
        SyncAction::Read => ApiRequest::patch(format!("{}/read", item_path(entity, id)), None),
        SyncAction::Archive => {
            ApiRequest::patch(format!("{}/archive", item_path(entity, id)), None)
        }
    };
    request.with_token(token)
}

/// The server assigns ids; a device-minted one is not sent.
fn create_body(data: &Value) -> Value {
    let mut body = data.clone();
    if let Value::Object(map) = &mut body {
        let local = map.get("id").and_then(Value::as_str).is_some_and(is_local_id);
        if local {
            map.remove("id");
        }
    }
    body
}

/// Body for `PATCH /notifications/bulk/read`.
pub fn bulk_read_body(ids: &[String]) -> Value {
    json!({ "ids": ids })
}
