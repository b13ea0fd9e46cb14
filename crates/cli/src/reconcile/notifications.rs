// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notifications: hybrid create, cached reads, queued status changes.

use medsync_core::id::{is_local_id, local_record_id};
use medsync_core::{
    EntityType, NewNotification, Notification, NotificationFilter, NotificationStats, Record,
    SyncAction, SyncStatus,
};
use serde_json::{json, Value};

use super::Reconciler;
use crate::error::{Error, Result};
use crate::sync::api::{self, NOTIFICATION_ARCHIVE, NOTIFICATION_READ};
use crate::sync::{ApiRequest, ApiResponse, GatewayError};

const ENTITY: EntityType = EntityType::Notification;

/// Hands reminders to the device's local notification facility.
pub trait ReminderScheduler: Send + Sync {
    fn schedule(&self, notification: &Notification);
}

/// Scheduler that only logs; used where no device facility exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogScheduler;

impl ReminderScheduler for LogScheduler {
    fn schedule(&self, notification: &Notification) {
        tracing::info!(
            id = %notification.id,
            kind = notification.kind.as_str(),
            at = ?notification.scheduled_for,
            "local reminder scheduled"
        );
    }
}

impl Reconciler {
    /// Creates a notification, falling back to a local copy.
    ///
    /// The API health endpoint is checked first. If it is down, or the POST
    /// fails for any reason, the notification is stored under a local id as
    /// unread and a CREATE is queued. A POST that succeeds with an unreadable
    /// body is never queued again; the input stands in for the server's copy.
    pub async fn create_notification(&self, input: NewNotification) -> Result<Notification> {
        let kind = input.validate().map_err(Error::validation)?;
        let now = self.ctx.clock.now();

        if self.ctx.session.has_token() && self.ctx.connectivity.api_available().await {
            let request =
                ApiRequest::post(ENTITY.resource(), input.to_payload()).with_token(self.ctx.token());
            match self.ctx.gateway.execute(request).await {
                Ok(response) => {
                    let body = response.into_object();
                    let server_id = body
                        .as_ref()
                        .and_then(|b| b.get("id"))
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    let notification = match decode(body) {
                        Ok(notification) => {
                            self.remember(&notification, false).await?;
                            notification
                        }
                        Err(err) => {
                            tracing::warn!(
                                entity = %ENTITY,
                                id = ?server_id,
                                error = %err,
                                "server accepted the notification but its copy was unreadable"
                            );
                            match server_id {
                                Some(id) => {
                                    let notification = input.into_local(id, kind, now);
                                    self.remember(&notification, false).await?;
                                    notification
                                }
                                // Not cached: the next listing brings in the server's copy.
                                None => input.into_local(local_record_id(&self.ctx.clock), kind, now),
                            }
                        }
                    };
                    if notification.needs_local_trigger(now) {
                        self.scheduler.schedule(&notification);
                    }
                    return Ok(notification);
                }
                Err(err) => {
                    tracing::warn!(
                        entity = %ENTITY,
                        action = %SyncAction::Create,
                        status = err.status(),
                        error = %err,
                        "notification create failed, keeping a local copy"
                    );
                }
            }
        }

        let id = local_record_id(&self.ctx.clock);
        let _guard = self.ctx.locks.lock(ENTITY, &id).await;
        let payload = input.to_payload();
        let notification = input.into_local(id.clone(), kind, now);
        self.remember(&notification, true).await?;
        self.enqueue(SyncAction::Create, ENTITY, &id, payload).await?;
        if notification.needs_local_trigger(now) {
            self.scheduler.schedule(&notification);
        }
        Ok(notification)
    }

    /// Lists a user's notifications.
    ///
    /// Online, the server page is cached and joined by matching local-only
    /// notifications. Offline, the filter is applied to the cache.
    pub async fn list_notifications(
        &self,
        user_id: &str,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>> {
        if self.online_with_token().await {
            let mut request = ApiRequest::get(ENTITY.resource()).with_token(self.ctx.token());
            for (key, value) in filter.query_pairs() {
                request = request.with_query(key, value);
            }
            let fetched = self
                .ctx
                .gateway
                .execute(request)
                .await
                .and_then(ApiResponse::into_list);
            match fetched {
                Ok(items) => {
                    let mut list: Vec<Notification> = items
                        .into_iter()
                        .filter_map(|item| match serde_json::from_value(item) {
                            Ok(n) => Some(n),
                            Err(e) => {
                                tracing::warn!(entity = %ENTITY, error = %e, "skipping server notification");
                                None
                            }
                        })
                        .collect();
                    let mut cache = self.ctx.notifications.lock().await;
                    cache.upsert_all(list.clone())?;
                    let mut merged: Vec<Notification> = cache
                        .for_user(user_id)
                        .into_iter()
                        .filter(|n| is_local_id(&n.id) && filter.matches(n))
                        .collect();
                    merged.append(&mut list);
                    return Ok(merged);
                }
                Err(GatewayError::NotFound) => {}
                Err(err) => {
                    tracing::warn!(
                        entity = %ENTITY,
                        status = err.status(),
                        error = %err,
                        "fetch failed, serving cached notifications"
                    );
                }
            }
        }
        let cached = self.ctx.notifications.lock().await.for_user(user_id);
        Ok(filter.apply(&cached))
    }

    pub async fn mark_read(&self, id: &str) -> Result<()> {
        self.change_status(id, SyncAction::Read).await
    }

    pub async fn archive(&self, id: &str) -> Result<()> {
        self.change_status(id, SyncAction::Archive).await
    }

    async fn change_status(&self, id: &str, action: SyncAction) -> Result<()> {
        let _guard = self.ctx.locks.lock(ENTITY, id).await;
        let now = self.ctx.clock.now();
        let apply = |n: &mut Notification| match action {
            SyncAction::Archive => n.archive(now),
            _ => n.mark_read(now),
        };

        if self.can_send_directly(ENTITY, id).await {
            let template = match action {
                SyncAction::Archive => NOTIFICATION_ARCHIVE,
                _ => NOTIFICATION_READ,
            };
            let request =
                ApiRequest::patch(api::with_id(template, id), None).with_token(self.ctx.token());
            match self.call_with_retry(request).await {
                Ok(_) => {
                    let updated = self.ctx.notifications.lock().await.update(id, apply)?;
                    if updated {
                        self.refresh_record(id, false).await?;
                    }
                    return Ok(());
                }
                Err(err) if err.is_retryable() => self.log_deferred(ENTITY, id, action, &err),
                Err(err) => return Err(err.into()),
            }
        }

        let updated = self.ctx.notifications.lock().await.update(id, apply)?;
        if !updated {
            return Err(Error::NotFound(format!("notification {id}")));
        }
        self.refresh_record(id, true).await?;
        self.enqueue(action, ENTITY, id, json!({ "id": id })).await
    }

    pub async fn delete_notification(&self, id: &str) -> Result<()> {
        let _guard = self.ctx.locks.lock(ENTITY, id).await;

        if is_local_id(id) {
            self.forget(id).await?;
            self.ctx.queue.lock().await.remove_for(ENTITY, id)?;
            return Ok(());
        }

        if self.can_send_directly(ENTITY, id).await {
            let request =
                ApiRequest::delete(api::with_id(api::NOTIFICATION_ITEM, id)).with_token(self.ctx.token());
            match self.call_with_retry(request).await {
                Ok(_) | Err(GatewayError::NotFound) => return self.forget(id).await,
                Err(err) if err.is_retryable() => {
                    self.log_deferred(ENTITY, id, SyncAction::Delete, &err);
                }
                Err(err) => return Err(err.into()),
            }
        }

        self.forget(id).await?;
        self.enqueue(SyncAction::Delete, ENTITY, id, Value::Null).await
    }

    /// Marks several notifications read. Returns how many were updated locally.
    ///
    /// Uses the bulk endpoint when possible; otherwise each id is marked
    /// individually, which queues them.
    pub async fn mark_many_read(&self, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let all_remote = ids.iter().all(|id| !is_local_id(id));
        if all_remote && self.online_with_token().await {
            let request = ApiRequest::patch(api::NOTIFICATION_BULK_READ, Some(api::bulk_read_body(ids)))
                .with_token(self.ctx.token());
            match self.call_with_retry(request).await {
                Ok(_) => {
                    let now = self.ctx.clock.now();
                    let mut updated = 0;
                    {
                        let mut cache = self.ctx.notifications.lock().await;
                        for id in ids {
                            if cache.update(id, |n| n.mark_read(now))? {
                                updated += 1;
                            }
                        }
                    }
                    return Ok(updated);
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(count = ids.len(), error = %err, "bulk read failed, marking one by one");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let mut updated = 0;
        for id in ids {
            match self.mark_read(id).await {
                Ok(()) => updated += 1,
                Err(Error::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(updated)
    }

    /// Counters from the server, or computed from the cache when offline.
    pub async fn stats(&self, user_id: &str) -> Result<NotificationStats> {
        let now = self.ctx.clock.now();
        if self.online_with_token().await {
            let request = ApiRequest::get(api::NOTIFICATION_STATS).with_token(self.ctx.token());
            match self.ctx.gateway.execute(request).await {
                Ok(response) => {
                    let body = response.into_object().unwrap_or_else(|| json!({}));
                    return Ok(NotificationStats::from_server(&body, now));
                }
                Err(err) => {
                    tracing::warn!(status = err.status(), error = %err, "stats unavailable, counting cache");
                }
            }
        }
        let cached = self.ctx.notifications.lock().await.for_user(user_id);
        Ok(NotificationStats::from_local(&cached, now))
    }

    /// Asks the server to purge old notifications, then refreshes the list.
    pub async fn cleanup_old(&self, user_id: &str) -> Result<Vec<Notification>> {
        if !self.ctx.connectivity.is_online().await {
            return Err(Error::Connectivity("cleanup needs the server".to_string()));
        }
        if !self.ctx.session.has_token() {
            return Err(Error::Auth("no access token for this session".to_string()));
        }
        let request = ApiRequest::delete(api::NOTIFICATION_CLEANUP).with_token(self.ctx.token());
        self.call_with_retry(request).await?;
        self.list_notifications(user_id, &NotificationFilter::default())
            .await
    }

    /// Writes a notification to the cache and mirrors it in the record store.
    async fn remember(&self, notification: &Notification, pending: bool) -> Result<()> {
        let now = self.ctx.clock.now();
        let payload = serde_json::to_value(notification)?;
        let mut record = Record::from_server(ENTITY, &notification.user_id, payload, now)?;
        if pending {
            record.sync_status = SyncStatus::Pending;
            record.is_offline = is_local_id(&notification.id);
        }
        self.ctx.store.lock().await.save(record);
        self.ctx.notifications.lock().await.upsert(notification.clone())
            .map_err(Error::from)
    }

    /// Re-mirrors a cached notification after a status change.
    async fn refresh_record(&self, id: &str, pending: bool) -> Result<()> {
        let cached = self.ctx.notifications.lock().await.get(id).cloned();
        match cached {
            Some(notification) => self.remember(&notification, pending).await,
            None => Ok(()),
        }
    }

    async fn forget(&self, id: &str) -> Result<()> {
        self.ctx.store.lock().await.delete(ENTITY, id);
        self.ctx.notifications.lock().await.remove(id)?;
        Ok(())
    }
}

fn decode(body: Option<Value>) -> Result<Notification> {
    let body = body
        .ok_or_else(|| Error::Protocol("notification response carried no record".to_string()))?;
    serde_json::from_value(body).map_err(|e| Error::Protocol(e.to_string()))
}
