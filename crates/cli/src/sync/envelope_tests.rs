// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for response-shape normalization.

#![allow(clippy::unwrap_used)]

use super::envelope::{normalize_list, normalize_object};
use super::gateway::GatewayError;
use serde_json::{json, Value};
use yare::parameterized;

#[parameterized(
    bare = { json!([{"id": "a"}, {"id": "b"}]) },
    items = { json!({"items": [{"id": "a"}, {"id": "b"}], "total": 2}) },
    events = { json!({"events": [{"id": "a"}, {"id": "b"}]}) },
    data = { json!({"data": [{"id": "a"}, {"id": "b"}]}) },
)]
fn list_shapes_normalize_to_items(body: Value) {
    let items = normalize_list(Some(body)).unwrap();
    let ids: Vec<_> = items.iter().map(|v| v["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn empty_body_is_empty_list() {
    assert!(normalize_list(None).unwrap().is_empty());
    assert!(normalize_list(Some(Value::Null)).unwrap().is_empty());
}

#[test]
fn unknown_shape_is_decode_error() {
    let err = normalize_list(Some(json!({"results": []}))).unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[test]
fn object_with_id_is_returned_as_is() {
    let body = json!({"id": "srv_1", "data": {"x": 1}});
    assert_eq!(normalize_object(Some(body.clone())), Some(body));
}

#[test]
fn data_wrapper_is_unwrapped() {
    let body = json!({"data": {"id": "srv_1"}});
    assert_eq!(normalize_object(Some(body)), Some(json!({"id": "srv_1"})));
}

#[test]
fn non_object_body_has_no_object() {
    assert_eq!(normalize_object(Some(json!([1, 2]))), None);
    assert_eq!(normalize_object(None), None);
}
