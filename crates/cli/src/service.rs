// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Service wiring: one place that builds the store, queue, gateway,
//! connectivity probe, drain engine, and reconciliation engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use medsync_core::{LocalStore, NotificationCache, SystemClock};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::{Config, DataPaths};
use crate::error::{Error, Result};
use crate::reconcile::Reconciler;
use crate::session::Session;
use crate::sync::{
    Backoff, Drainer, HttpGateway, HttpProbe, RecordLocks, SyncContext, SyncQueue, TokioDelay,
};

pub struct SyncServices {
    config: Config,
    ctx: SyncContext,
    drainer: Drainer,
    reconciler: Reconciler,
}

/// Snapshot for `medsync status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub online: bool,
    pub api_available: bool,
    pub signed_in: bool,
    pub pending: usize,
    /// Pending items per entity type.
    pub pending_by_entity: BTreeMap<String, usize>,
    pub records: usize,
    pub notifications: usize,
    /// True when the record store fell back to memory-only.
    pub degraded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub records: usize,
    pub notifications: usize,
}

impl SyncServices {
    /// Opens persisted state under `paths` and builds HTTP clients from `config`.
    pub fn open(config: Config, paths: &DataPaths, session: Session) -> Result<Self> {
        let store = LocalStore::open(&paths.db());
        let queue = SyncQueue::open(&paths.queue())?;
        let notifications = NotificationCache::open(&paths.notifications())?;
        let gateway = HttpGateway::new(&config.api.base_url, config.api.timeout())
            .map_err(|e| Error::Config(format!("failed to build http client: {}", e)))?;
        let probe = HttpProbe::new(
            config.connectivity.probe_urls.clone(),
            &config.api.base_url,
            &config.connectivity.health_path,
            config.connectivity.timeout(),
        )
        .map_err(|e| Error::Config(format!("failed to build http client: {}", e)))?;

        let ctx = SyncContext {
            store: Arc::new(Mutex::new(store)),
            queue: Arc::new(Mutex::new(queue)),
            notifications: Arc::new(Mutex::new(notifications)),
            gateway: Arc::new(gateway),
            connectivity: Arc::new(probe),
            delay: Arc::new(TokioDelay),
            clock: Arc::new(SystemClock),
            locks: Arc::new(RecordLocks::new()),
            session,
        };
        let services = Self::from_context(config, ctx);
        Ok(SyncServices {
            drainer: services.drainer.with_lock_file(paths.drain_lock()),
            ..services
        })
    }

    /// Builds the engines over an existing context.
    pub fn from_context(config: Config, ctx: SyncContext) -> Self {
        let backoff = Backoff::from_config(&config.sync);
        let drainer = Drainer::new(ctx.clone(), backoff, config.sync.drain_max_retries);
        let reconciler = Reconciler::new(ctx.clone(), backoff, config.sync.reconcile_max_retries);
        SyncServices {
            config,
            ctx,
            drainer,
            reconciler,
        }
    }

    /// Loads the record store. Safe to call more than once.
    pub async fn init(&self) -> Result<()> {
        self.ctx.store.lock().await.init()?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.ctx.session
    }

    pub fn drainer(&self) -> &Drainer {
        &self.drainer
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub async fn status(&self) -> Result<StatusReport> {
        let online = self.ctx.connectivity.is_online().await;
        let api_available = online && self.ctx.connectivity.api_available().await;

        let (pending, pending_by_entity) = {
            let mut queue = self.ctx.queue.lock().await;
            queue.reload()?;
            let mut by_entity = BTreeMap::new();
            for item in queue.snapshot() {
                *by_entity
                    .entry(item.entity_type.as_str().to_string())
                    .or_insert(0) += 1;
            }
            (queue.len(), by_entity)
        };
        let (records, degraded) = {
            let store = self.ctx.store.lock().await;
            (store.len(), store.is_degraded())
        };
        let notifications = self.ctx.notifications.lock().await.len();

        Ok(StatusReport {
            online,
            api_available,
            signed_in: self.ctx.session.has_token(),
            pending,
            pending_by_entity,
            records,
            notifications,
            degraded,
        })
    }

    /// Drops confirmed local data older than `days`. Unsynced data is kept.
    pub async fn cleanup(&self, days: u32) -> Result<CleanupReport> {
        let cutoff = self.ctx.clock.now() - Duration::days(i64::from(days));
        let records = self.ctx.store.lock().await.prune_older_than(cutoff);
        let notifications = self
            .ctx
            .notifications
            .lock()
            .await
            .prune_older_than(cutoff)?;
        tracing::info!(records, notifications, days, "local cleanup finished");
        Ok(CleanupReport {
            records,
            notifications,
        })
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
