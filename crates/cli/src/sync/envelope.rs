// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Response-shape normalization.
//!
//! List endpoints answer with a bare array or with the array wrapped in
//! `items`, `events`, or `data`. Everything past the gateway sees a plain
//! `Vec<Value>`.

use serde::Deserialize;
use serde_json::Value;

use super::gateway::{GatewayError, GatewayResult};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListEnvelope {
    Bare(Vec<Value>),
    Items { items: Vec<Value> },
    Events { events: Vec<Value> },
    Data { data: Vec<Value> },
}

impl ListEnvelope {
    fn into_items(self) -> Vec<Value> {
        match self {
            ListEnvelope::Bare(items)
            | ListEnvelope::Items { items }
            | ListEnvelope::Events { events: items }
            | ListEnvelope::Data { data: items } => items,
        }
    }
}

/// Decodes a list body. An empty body is an empty list.
pub fn normalize_list(body: Option<Value>) -> GatewayResult<Vec<Value>> {
    match body {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value::<ListEnvelope>(value)
            .map(ListEnvelope::into_items)
            .map_err(|_| GatewayError::Decode("expected a list or {items|events|data}".into())),
    }
}

/// Decodes a single-object body, unwrapping `{data: {...}}` when the object
/// itself carries no `id`.
pub fn normalize_object(body: Option<Value>) -> Option<Value> {
    match body? {
        Value::Object(map) if !map.contains_key("id") => {
            if let Some(inner @ Value::Object(_)) = map.get("data") {
                return Some(inner.clone());
            }
            Some(Value::Object(map))
        }
        other @ Value::Object(_) => Some(other),
        _ => None,
    }
}
