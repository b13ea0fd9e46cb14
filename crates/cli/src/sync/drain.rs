// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue drain engine.
//!
//! A drain pass works on a snapshot of the queue and proceeds in rounds.
//! Every item is attempted at most once per round; items that failed with a
//! retryable error are attempted again in the next round, after a single
//! backoff delay. A later item for a record whose earlier item failed in the
//! current round waits for the next round without using up a retry, so
//! mutations to one record always reach the server in order.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use medsync_core::{EntityType, Notification, Record, SyncAction, SyncQueueItem};
use serde::Serialize;
use tokio::sync::Mutex;

use super::api;
use super::backoff::Backoff;
use super::context::SyncContext;
use super::gateway::{ApiResponse, GatewayError};
use super::queue::QueueError;
use crate::error::Result;

/// How a drain pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainOutcome {
    /// The queue was processed.
    Completed,
    /// Nothing was queued.
    Empty,
    /// Connectivity check failed; nothing was attempted.
    Offline,
    /// Another drain held the lock.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub outcome: DrainOutcome,
    /// Items confirmed by the server and removed.
    pub synced: usize,
    /// Items dropped after exhausting retries or being rejected.
    pub failed: usize,
    /// Items left in place because the server refused the credential.
    pub blocked: usize,
    /// Retries scheduled across all rounds.
    pub retries: usize,
    pub rounds: u32,
    /// Queue length after the pass.
    pub remaining: usize,
}

impl DrainReport {
    fn new(outcome: DrainOutcome) -> Self {
        DrainReport {
            outcome,
            synced: 0,
            failed: 0,
            blocked: 0,
            retries: 0,
            rounds: 0,
            remaining: 0,
        }
    }
}

enum Attempt {
    /// Confirmed; carries the server id when it differs from the queued target.
    Done(Option<String>),
    Retry(GatewayError),
    Blocked,
    Rejected(GatewayError),
}

type Key = (EntityType, String);

pub struct Drainer {
    ctx: SyncContext,
    backoff: Backoff,
    max_retries: u32,
    lock_path: Option<PathBuf>,
    running: Mutex<()>,
}

impl Drainer {
    pub fn new(ctx: SyncContext, backoff: Backoff, max_retries: u32) -> Self {
        Drainer {
            ctx,
            backoff,
            max_retries,
            lock_path: None,
            running: Mutex::new(()),
        }
    }

    /// Also exclude drains running in other processes, via a lock file.
    pub fn with_lock_file(mut self, path: PathBuf) -> Self {
        self.lock_path = Some(path);
        self
    }

    /// Replays the queue against the server.
    ///
    /// Per-item failures never abort the pass; only local persistence
    /// errors are returned.
    pub async fn drain(&self) -> Result<DrainReport> {
        let Ok(_running) = self.running.try_lock() else {
            tracing::debug!("drain already running, skipping");
            return Ok(DrainReport::new(DrainOutcome::Skipped));
        };
        let _file_lock = match &self.lock_path {
            Some(path) => match acquire_lock(path) {
                Ok(file) => Some(file),
                Err(e) => {
                    tracing::debug!(error = %e, "drain lock held elsewhere, skipping");
                    return Ok(DrainReport::new(DrainOutcome::Skipped));
                }
            },
            None => None,
        };

        let mut pending = {
            let mut queue = self.ctx.queue.lock().await;
            queue.reload()?;
            queue.snapshot()
        };
        if pending.is_empty() {
            return Ok(DrainReport::new(DrainOutcome::Empty));
        }
        if !self.ctx.connectivity.is_online().await {
            tracing::info!(pending = pending.len(), "offline, leaving queue for later");
            let mut report = DrainReport::new(DrainOutcome::Offline);
            report.remaining = pending.len();
            return Ok(report);
        }

        tracing::info!(pending = pending.len(), "draining sync queue");
        let mut report = DrainReport::new(DrainOutcome::Completed);
        let mut renamed: HashMap<Key, String> = HashMap::new();
        let mut parked: HashSet<Key> = HashSet::new();
        let mut round = 0;

        loop {
            report.rounds += 1;
            let mut failed_targets: HashSet<Key> = HashSet::new();
            let mut next = Vec::new();

            for mut item in pending {
                if let Some(new_id) = renamed.get(&(item.entity_type, item.target_id.clone())) {
                    item.target_id = new_id.clone();
                }
                let key = (item.entity_type, item.target_id.clone());
                if parked.contains(&key) {
                    report.blocked += 1;
                    continue;
                }
                if failed_targets.contains(&key) {
                    next.push(item);
                    continue;
                }

                match self.attempt(&item).await? {
                    Attempt::Done(new_id) => {
                        report.synced += 1;
                        if let Some(new_id) = new_id {
                            renamed.insert(key, new_id);
                        }
                    }
                    Attempt::Retry(err) if item.retry_count < self.max_retries => {
                        item.retry_count += 1;
                        let updated = self
                            .ctx
                            .queue
                            .lock()
                            .await
                            .set_retry_count(&item.id, item.retry_count);
                        match updated {
                            Ok(()) => {}
                            // Deleted locally while the request was in flight.
                            Err(QueueError::NotFound(_)) => {
                                tracing::debug!(
                                    id = %item.id,
                                    target = %item.target_id,
                                    "queue item gone after failed attempt, nothing to retry"
                                );
                                continue;
                            }
                            Err(e) => return Err(e.into()),
                        }
                        tracing::warn!(
                            entity = %item.entity_type,
                            id = %item.target_id,
                            action = %item.action,
                            status = err.status(),
                            retry = item.retry_count,
                            error = %err,
                            "sync failed, will retry"
                        );
                        report.retries += 1;
                        failed_targets.insert(key);
                        next.push(item);
                    }
                    Attempt::Retry(err) => {
                        self.abandon(&item, &err).await?;
                        report.failed += 1;
                        failed_targets.insert(key);
                    }
                    Attempt::Blocked => {
                        report.blocked += 1;
                        parked.insert(key);
                    }
                    Attempt::Rejected(err) => {
                        self.abandon(&item, &err).await?;
                        report.failed += 1;
                        failed_targets.insert(key);
                    }
                }
            }

            if next.is_empty() {
                break;
            }
            self.ctx.delay.sleep(self.backoff.delay_for(round)).await;
            round += 1;
            pending = next;
        }

        report.remaining = self.ctx.queue.lock().await.len();
        tracing::info!(
            synced = report.synced,
            failed = report.failed,
            blocked = report.blocked,
            remaining = report.remaining,
            "drain finished"
        );
        Ok(report)
    }

    async fn attempt(&self, item: &SyncQueueItem) -> Result<Attempt> {
        let _guard = self.ctx.locks.lock(item.entity_type, &item.target_id).await;
        let request = api::dispatch(item, self.ctx.token());

        match self.ctx.gateway.execute(request).await {
            Ok(response) => Ok(Attempt::Done(self.complete(item, Some(response)).await?)),
            // Already gone on the server.
            Err(GatewayError::NotFound) if item.action == SyncAction::Delete => {
                Ok(Attempt::Done(self.complete(item, None).await?))
            }
            Err(err) if err.is_auth() => {
                tracing::warn!(
                    entity = %item.entity_type,
                    id = %item.target_id,
                    action = %item.action,
                    status = err.status(),
                    "credential refused, item stays queued"
                );
                Ok(Attempt::Blocked)
            }
            Err(err) if err.is_retryable() => Ok(Attempt::Retry(err)),
            Err(err) => Ok(Attempt::Rejected(err)),
        }
    }

    /// Applies a confirmed mutation locally and removes the queue item.
    async fn complete(
        &self,
        item: &SyncQueueItem,
        response: Option<ApiResponse>,
    ) -> Result<Option<String>> {
        let now = self.ctx.clock.now();
        let entity = item.entity_type;
        let target = item.target_id.as_str();
        let server_copy = response.and_then(ApiResponse::into_object);
        let mut new_id = None;

        {
            let mut store = self.ctx.store.lock().await;
            match item.action {
                SyncAction::Delete => {
                    store.delete(entity, target);
                }
                SyncAction::Create => {
                    let owner = store
                        .get(entity, target)
                        .map(|r| r.owner_id.clone())
                        .unwrap_or_default();
                    let record = server_copy
                        .clone()
                        .and_then(|obj| Record::from_server(entity, &owner, obj, now).ok());
                    match record {
                        Some(record) => {
                            if record.id != target {
                                store.delete(entity, target);
                                new_id = Some(record.id.clone());
                            }
                            store.save(record);
                        }
                        None => {
                            store.mark_synced(entity, target, now);
                        }
                    }
                }
                SyncAction::Update | SyncAction::Read | SyncAction::Archive => {
                    store.mark_synced(entity, target, now);
                }
            }
        }

        if entity == EntityType::Notification {
            let mut cache = self.ctx.notifications.lock().await;
            match item.action {
                SyncAction::Delete => {
                    cache.remove(target)?;
                }
                SyncAction::Create => {
                    let confirmed = server_copy
                        .and_then(|obj| serde_json::from_value::<Notification>(obj).ok());
                    if let Some(notification) = confirmed {
                        cache.replace(target, notification)?;
                    }
                }
                SyncAction::Read => {
                    cache.update(target, |n| n.mark_read(now))?;
                }
                SyncAction::Archive => {
                    cache.update(target, |n| n.archive(now))?;
                }
                SyncAction::Update => {}
            }
        }

        let mut queue = self.ctx.queue.lock().await;
        queue.remove(&item.id)?;
        if let Some(new_id) = &new_id {
            queue.retarget(entity, target, new_id)?;
        }
        tracing::debug!(
            entity = %entity,
            id = %target,
            action = %item.action,
            "synced"
        );
        Ok(new_id)
    }

    /// Drops an item for good and flags its record.
    async fn abandon(&self, item: &SyncQueueItem, err: &GatewayError) -> Result<()> {
        tracing::error!(
            entity = %item.entity_type,
            id = %item.target_id,
            action = %item.action,
            status = err.status(),
            retries = item.retry_count,
            error = %err,
            "giving up on queued mutation"
        );
        let now = self.ctx.clock.now();
        self.ctx
            .store
            .lock()
            .await
            .mark_failed(item.entity_type, &item.target_id, now);
        self.ctx.queue.lock().await.remove(&item.id)?;
        Ok(())
    }
}

fn acquire_lock(lock_path: &Path) -> std::io::Result<fs::File> {
    use fs2::FileExt;

    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| std::io::Error::other("another drain is already running"))?;
    Ok(file)
}
