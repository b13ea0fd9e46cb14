// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation engine.
//!
//! Decides, per call, whether to talk to the server or to the local store,
//! and merges the two views on reads. Write policy differs by entity:
//!
//! | entity                              | offline write                 |
//! |-------------------------------------|-------------------------------|
//! | medication, appointment, treatment  | stored locally and queued     |
//! | intake event                        | refused with a connectivity error |
//! | notification                        | stored locally and queued     |

mod intake;
mod notifications;

pub use intake::RegisteredEvent;
pub use notifications::{LogScheduler, ReminderScheduler};

use std::collections::HashSet;
use std::sync::Arc;

use medsync_core::id::{is_local_id, local_record_id, queue_item_id};
use medsync_core::{EntityType, Record, SyncAction, SyncStatus};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::sync::api;
use crate::sync::{
    ApiRequest, ApiResponse, Backoff, GatewayError, GatewayResult, SyncContext,
};

pub struct Reconciler {
    ctx: SyncContext,
    backoff: Backoff,
    max_attempts: u32,
    scheduler: Arc<dyn ReminderScheduler>,
}

impl Reconciler {
    /// `max_attempts` bounds in-line server calls, first try included.
    pub fn new(ctx: SyncContext, backoff: Backoff, max_attempts: u32) -> Self {
        Reconciler {
            ctx,
            backoff,
            max_attempts,
            scheduler: Arc::new(LogScheduler),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn ReminderScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }

    /// Merged view of one entity type for an owner.
    ///
    /// Online, server records replace local copies with the same id and are
    /// joined by records that exist only on this device. A 404 means the
    /// server has none. Offline, or when the fetch fails, the local store is
    /// returned as is.
    pub async fn get_records(&self, entity: EntityType, owner_id: &str) -> Result<Vec<Record>> {
        if self.online_with_token().await {
            let request = api::list_request(entity, owner_id).with_token(self.ctx.token());
            let fetched = self
                .ctx
                .gateway
                .execute(request)
                .await
                .and_then(ApiResponse::into_list);
            match fetched {
                Ok(items) => return Ok(self.merge(entity, owner_id, items).await),
                Err(GatewayError::NotFound) => return Ok(self.merge(entity, owner_id, Vec::new()).await),
                Err(err) => {
                    tracing::warn!(
                        entity = %entity,
                        owner = owner_id,
                        status = err.status(),
                        error = %err,
                        "fetch failed, serving local records"
                    );
                }
            }
        }
        Ok(self.ctx.store.lock().await.get_all(entity, owner_id))
    }

    async fn merge(&self, entity: EntityType, owner_id: &str, items: Vec<Value>) -> Vec<Record> {
        let now = self.ctx.clock.now();
        let mut store = self.ctx.store.lock().await;
        let mut seen = HashSet::new();
        let mut merged = Vec::with_capacity(items.len());

        for item in items {
            match Record::from_server(entity, owner_id, item, now) {
                Ok(record) => {
                    if seen.insert(record.id.clone()) {
                        store.save(record.clone());
                        merged.push(record);
                    }
                }
                Err(e) => tracing::warn!(entity = %entity, error = %e, "skipping server record"),
            }
        }
        for record in store.offline_records(entity, owner_id) {
            if !seen.contains(&record.id) {
                merged.push(record);
            }
        }
        merged
    }

    /// Creates a medication, appointment, treatment, or note.
    ///
    /// Without a connection, or when the server cannot be reached after
    /// retries, the record is kept under a local id and a CREATE is queued.
    pub async fn create_record(
        &self,
        entity: EntityType,
        owner_id: &str,
        payload: Value,
    ) -> Result<Record> {
        check_queued_entity(entity)?;
        let Value::Object(mut fields) = payload else {
            return Err(Error::Validation("payload must be a JSON object".to_string()));
        };
        fields.insert(
            entity.owner_field().to_string(),
            Value::String(owner_id.to_string()),
        );
        let payload = Value::Object(fields);

        if self.online_with_token().await {
            let request =
                ApiRequest::post(entity.resource(), payload.clone()).with_token(self.ctx.token());
            match self.call_with_retry(request).await {
                Ok(response) => {
                    let record = self.confirmed(entity, owner_id, response)?;
                    let _guard = self.ctx.locks.lock(entity, &record.id).await;
                    self.ctx.store.lock().await.save(record.clone());
                    return Ok(record);
                }
                Err(err) if err.is_retryable() => {
                    self.log_deferred(entity, "-", SyncAction::Create, &err);
                }
                Err(err) => return Err(err.into()),
            }
        }

        let now = self.ctx.clock.now();
        let id = local_record_id(&self.ctx.clock);
        let _guard = self.ctx.locks.lock(entity, &id).await;
        let record = Record::local(entity, id.clone(), owner_id, payload, now);
        self.ctx.store.lock().await.save(record.clone());
        self.enqueue(SyncAction::Create, entity, &id, record.payload.clone())
            .await?;
        Ok(record)
    }

    /// Applies a partial update.
    ///
    /// Goes to the queue when offline, when the record has not reached the
    /// server yet, or when earlier mutations for it are still queued.
    pub async fn update_record(&self, entity: EntityType, id: &str, patch: Value) -> Result<Record> {
        check_queued_entity(entity)?;
        if !patch.is_object() {
            return Err(Error::Validation("patch must be a JSON object".to_string()));
        }
        let _guard = self.ctx.locks.lock(entity, id).await;
        let existing = self
            .ctx
            .store
            .lock()
            .await
            .get(entity, id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("{entity} {id}")))?;

        if self.can_send_directly(entity, id).await {
            let request = ApiRequest::patch(api::item_path(entity, id), Some(patch.clone()))
                .with_token(self.ctx.token());
            match self.call_with_retry(request).await {
                Ok(response) => {
                    let now = self.ctx.clock.now();
                    let record = match response.into_object() {
                        Some(obj) => Record::from_server(entity, &existing.owner_id, obj, now)
                            .map_err(|e| Error::Protocol(e.to_string()))?,
                        None => {
                            let mut record = existing;
                            record.apply_patch(&patch, now);
                            record.mark_synced(now);
                            record
                        }
                    };
                    self.ctx.store.lock().await.save(record.clone());
                    return Ok(record);
                }
                Err(err) if err.is_retryable() => {
                    self.log_deferred(entity, id, SyncAction::Update, &err);
                }
                Err(err) => return Err(err.into()),
            }
        }

        let now = self.ctx.clock.now();
        let mut record = existing;
        record.apply_patch(&patch, now);
        record.sync_status = SyncStatus::Pending;
        self.ctx.store.lock().await.save(record.clone());
        self.enqueue(SyncAction::Update, entity, id, patch).await?;
        Ok(record)
    }

    /// Deletes a record locally and on the server.
    ///
    /// A record that never reached the server is dropped together with its
    /// queued mutations; nothing is sent.
    pub async fn delete_record(&self, entity: EntityType, id: &str) -> Result<()> {
        check_queued_entity(entity)?;
        let _guard = self.ctx.locks.lock(entity, id).await;

        if is_local_id(id) {
            self.ctx.store.lock().await.delete(entity, id);
            let dropped = self.ctx.queue.lock().await.remove_for(entity, id)?;
            tracing::debug!(entity = %entity, id, dropped, "discarded unsynced record");
            return Ok(());
        }

        if self.can_send_directly(entity, id).await {
            let request = ApiRequest::delete(api::item_path(entity, id)).with_token(self.ctx.token());
            match self.call_with_retry(request).await {
                Ok(_) | Err(GatewayError::NotFound) => {
                    self.ctx.store.lock().await.delete(entity, id);
                    return Ok(());
                }
                Err(err) if err.is_retryable() => {
                    self.log_deferred(entity, id, SyncAction::Delete, &err);
                }
                Err(err) => return Err(err.into()),
            }
        }

        self.ctx.store.lock().await.delete(entity, id);
        self.enqueue(SyncAction::Delete, entity, id, Value::Null).await?;
        Ok(())
    }

    /// Sends a request, retrying retryable failures with backoff.
    pub(crate) async fn call_with_retry(&self, request: ApiRequest) -> GatewayResult<ApiResponse> {
        let mut attempt = 0;
        loop {
            match self.ctx.gateway.execute(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt + 1 < self.max_attempts => {
                    tracing::debug!(
                        method = request.method.as_str(),
                        path = %request.path,
                        attempt,
                        error = %err,
                        "request failed, retrying"
                    );
                    self.ctx.delay.sleep(self.backoff.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn online_with_token(&self) -> bool {
        self.ctx.session.has_token() && self.ctx.connectivity.is_online().await
    }

    /// True when a mutation may skip the queue without reordering it.
    async fn can_send_directly(&self, entity: EntityType, id: &str) -> bool {
        if is_local_id(id) {
            return false;
        }
        if !self.ctx.queue.lock().await.items_for(entity, id).is_empty() {
            return false;
        }
        self.online_with_token().await
    }

    fn confirmed(&self, entity: EntityType, owner_id: &str, response: ApiResponse) -> Result<Record> {
        let body = response
            .into_object()
            .ok_or_else(|| Error::Protocol(format!("{entity} response carried no record")))?;
        Record::from_server(entity, owner_id, body, self.ctx.clock.now())
            .map_err(|e| Error::Protocol(e.to_string()))
    }

    async fn enqueue(
        &self,
        action: SyncAction,
        entity: EntityType,
        target_id: &str,
        data: Value,
    ) -> Result<()> {
        let now = self.ctx.clock.now();
        let id = queue_item_id(&self.ctx.clock);
        self.ctx
            .queue
            .lock()
            .await
            .enqueue(id, action, entity, target_id, data, now)?;
        Ok(())
    }

    fn log_deferred(&self, entity: EntityType, id: &str, action: SyncAction, err: &GatewayError) {
        tracing::warn!(
            entity = %entity,
            id,
            action = %action,
            status = err.status(),
            error = %err,
            "server unreachable, queued for the next drain"
        );
    }
}

/// Entities whose writes go through the generic queued path.
fn check_queued_entity(entity: EntityType) -> Result<()> {
    match entity {
        EntityType::Medication
        | EntityType::Appointment
        | EntityType::Treatment
        | EntityType::Note => Ok(()),
        other => Err(Error::Validation(format!(
            "{other} records are not written through this path"
        ))),
    }
}



#[cfg(test)]
mod records_tests;
