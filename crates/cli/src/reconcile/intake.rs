// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Intake events: online-only writes, merged reads.

use chrono::{DateTime, Utc};
use medsync_core::{EntityType, NewIntakeEvent, Record};
use serde::Serialize;

use super::Reconciler;
use crate::error::{Error, Result};
use crate::sync::ApiRequest;

/// A newly registered event and the refreshed list that contains it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredEvent {
    pub event: Record,
    pub events: Vec<Record>,
}

impl Reconciler {
    /// Intake events for a profile, latest `scheduledFor` first.
    pub async fn get_events(&self, owner_id: &str) -> Result<Vec<Record>> {
        let mut events = self.get_records(EntityType::IntakeEvent, owner_id).await?;
        events.sort_by(|a, b| scheduled_for(b).cmp(&scheduled_for(a)));
        Ok(events)
    }

    /// Records that a dose was taken, snoozed, or skipped.
    ///
    /// Needs the server: nothing is stored locally unless the server
    /// confirms it.
    pub async fn register_event(&self, input: &NewIntakeEvent) -> Result<RegisteredEvent> {
        let now = self.ctx.clock.now();
        let event = input.validate(now).map_err(Error::validation)?;

        if !self.ctx.connectivity.is_online().await {
            return Err(Error::Connectivity(
                "the event was not saved, try again once connected".to_string(),
            ));
        }
        let Some(token) = self.ctx.token() else {
            return Err(Error::Auth("no access token for this session".to_string()));
        };

        let request = ApiRequest::post(EntityType::IntakeEvent.resource(), event.to_payload())
            .with_token(Some(token));
        let response = self.call_with_retry(request).await?;
        let record = self.confirmed(EntityType::IntakeEvent, &event.patient_profile_id, response)?;
        {
            let _guard = self
                .ctx
                .locks
                .lock(EntityType::IntakeEvent, &record.id)
                .await;
            self.ctx.store.lock().await.save(record.clone());
        }
        tracing::info!(
            entity = %EntityType::IntakeEvent,
            id = %record.id,
            action = event.action.as_str(),
            "intake event registered"
        );

        let events = self.get_events(&event.patient_profile_id).await?;
        Ok(RegisteredEvent {
            event: record,
            events,
        })
    }
}

fn scheduled_for(record: &Record) -> Option<DateTime<Utc>> {
    record
        .field_str("scheduledFor")
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
