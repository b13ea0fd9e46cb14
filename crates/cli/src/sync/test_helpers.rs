// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync and reconcile tests.

#![allow(clippy::unwrap_used)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use medsync_core::id::queue_item_id;
use medsync_core::{
    EntityType, LocalStore, ManualClock, NotificationCache, Record, SyncAction, SyncQueueItem,
};
use serde_json::{json, Value};

use super::backoff::{Backoff, Delay};
use super::connectivity::Connectivity;
use super::context::SyncContext;
use super::gateway::{ApiRequest, ApiResponse, Gateway, GatewayError, GatewayResult, Method};
use super::locks::RecordLocks;
use super::queue::SyncQueue;
use crate::session::Session;

pub const PROFILE: &str = "p1";
pub const USER: &str = "u1";
pub const TOKEN: &str = "tok";

/// Fixed test instant: 2026-03-01T08:00:00Z.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
}

/// 1s base, 30s cap.
pub fn backoff() -> Backoff {
    Backoff::new(Duration::from_millis(1000), Duration::from_millis(30_000))
}

type Responder = Box<dyn Fn(&ApiRequest) -> GatewayResult<ApiResponse> + Send + Sync>;

/// Gateway answering from a closure and recording every request.
pub struct MockGateway {
    responder: Responder,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockGateway {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ApiRequest) -> GatewayResult<ApiResponse> + Send + Sync + 'static,
    {
        MockGateway {
            responder: Box::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// POST echoes the body with a server id; everything else answers 200
    /// with an empty body.
    pub fn echo() -> Self {
        let created = AtomicUsize::new(0);
        Self::new(move |req| match req.method {
            Method::Post => {
                let n = created.fetch_add(1, Ordering::SeqCst) + 1;
                let mut body = req.body.clone().unwrap_or_else(|| json!({}));
                body["id"] = Value::String(format!("srv-{n}"));
                Ok(ApiResponse::new(201, Some(body)))
            }
            _ => Ok(ApiResponse::new(200, None)),
        })
    }

    /// Every request fails with `err`.
    pub fn failing(err: GatewayError) -> Self {
        Self::new(move |_| Err(err.clone()))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests with the given method.
    pub fn count_method(&self, method: Method) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }
}

impl Gateway for MockGateway {
    fn execute(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<ApiResponse>> + Send + '_>> {
        let result = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        Box::pin(async move { result })
    }
}

/// Connectivity with switchable answers and a probe counter.
pub struct MockConnectivity {
    online: AtomicBool,
    api: AtomicBool,
    probes: AtomicUsize,
}

impl MockConnectivity {
    pub fn new(online: bool, api: bool) -> Self {
        MockConnectivity {
            online: AtomicBool::new(online),
            api: AtomicBool::new(api),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn set_api(&self, api: bool) {
        self.api.store(api, Ordering::SeqCst);
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl Connectivity for MockConnectivity {
    fn is_online(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let online = self.online.load(Ordering::SeqCst);
        Box::pin(async move { online })
    }

    fn api_available(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let api = self.online.load(Ordering::SeqCst) && self.api.load(Ordering::SeqCst);
        Box::pin(async move { api })
    }
}

/// Delay that returns at once and remembers what it was asked for.
#[derive(Default)]
pub struct RecordingDelay {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn millis(&self) -> Vec<u128> {
        self.delays().iter().map(Duration::as_millis).collect()
    }
}

impl Delay for RecordingDelay {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.delays.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}

/// A context over in-memory state plus handles to its test doubles.
pub struct Harness {
    pub ctx: SyncContext,
    pub gateway: Arc<MockGateway>,
    pub connectivity: Arc<MockConnectivity>,
    pub delay: Arc<RecordingDelay>,
    pub clock: Arc<ManualClock>,
}

/// Online, API reachable, signed in as [`USER`] for profile [`PROFILE`].
pub fn harness(gateway: MockGateway) -> Harness {
    let gateway = Arc::new(gateway);
    let connectivity = Arc::new(MockConnectivity::new(true, true));
    let delay = Arc::new(RecordingDelay::default());
    let clock = Arc::new(ManualClock::new(t0().timestamp_millis() as u64));
    let ctx = SyncContext {
        store: Arc::new(tokio::sync::Mutex::new(LocalStore::in_memory())),
        queue: Arc::new(tokio::sync::Mutex::new(SyncQueue::in_memory())),
        notifications: Arc::new(tokio::sync::Mutex::new(NotificationCache::in_memory())),
        gateway: gateway.clone(),
        connectivity: connectivity.clone(),
        delay: delay.clone(),
        clock: clock.clone(),
        locks: Arc::new(RecordLocks::new()),
        session: Session::new(Some(TOKEN.to_string()))
            .with_profile(PROFILE)
            .with_user(USER),
    };
    Harness {
        ctx,
        gateway,
        connectivity,
        delay,
        clock,
    }
}

impl Harness {
    pub fn offline(self) -> Self {
        self.connectivity.set_online(false);
        self
    }

    /// Drops the bearer token from the session.
    pub fn signed_out(mut self) -> Self {
        self.ctx.session = Session::new(None).with_profile(PROFILE).with_user(USER);
        self
    }

    /// Stores a record that exists only on the device.
    pub async fn seed_local(&self, entity: EntityType, id: &str, payload: Value) -> Record {
        let record = Record::local(entity, id.to_string(), PROFILE, payload, t0());
        self.ctx.store.lock().await.save(record.clone());
        record
    }

    /// Stores a record as if it had come from the server.
    pub async fn seed_synced(&self, entity: EntityType, payload: Value) -> Record {
        let record = Record::from_server(entity, PROFILE, payload, t0()).unwrap();
        self.ctx.store.lock().await.save(record.clone());
        record
    }

    pub async fn enqueue(
        &self,
        action: SyncAction,
        entity: EntityType,
        target: &str,
        data: Value,
    ) -> SyncQueueItem {
        self.clock.advance(1);
        let id = queue_item_id(&self.clock);
        self.ctx
            .queue
            .lock()
            .await
            .enqueue(id, action, entity, target, data, t0())
            .unwrap()
    }

    pub async fn record(&self, entity: EntityType, id: &str) -> Option<Record> {
        self.ctx.store.lock().await.get(entity, id).cloned()
    }

    pub async fn queued(&self) -> Vec<SyncQueueItem> {
        self.ctx.queue.lock().await.snapshot()
    }
}
