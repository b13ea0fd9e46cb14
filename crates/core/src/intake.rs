// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Medication/treatment adherence events ("intake events").

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// What the event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntakeKind {
    /// A medication dose.
    Med,
    /// A treatment session.
    Trt,
}

impl IntakeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntakeKind::Med => "MED",
            IntakeKind::Trt => "TRT",
        }
    }
}

impl fmt::Display for IntakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IntakeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "MED" => Ok(IntakeKind::Med),
            "TRT" => Ok(IntakeKind::Trt),
            _ => Err(Error::InvalidIntakeKind(s.to_string())),
        }
    }
}

/// What the patient did with the scheduled dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntakeAction {
    Taken,
    Snooze,
    Skipped,
}

impl IntakeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntakeAction::Taken => "TAKEN",
            IntakeAction::Snooze => "SNOOZE",
            IntakeAction::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for IntakeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IntakeAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TAKEN" => Ok(IntakeAction::Taken),
            "SNOOZE" => Ok(IntakeAction::Snooze),
            "SKIPPED" => Ok(IntakeAction::Skipped),
            _ => Err(Error::InvalidIntakeAction(s.to_string())),
        }
    }
}

/// Caller input for registering an intake event, as it arrives from a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIntakeEvent {
    pub kind: String,
    pub ref_id: String,
    pub action: String,
    pub patient_profile_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// An intake event that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidIntakeEvent {
    pub kind: IntakeKind,
    pub ref_id: String,
    pub action: IntakeAction,
    pub patient_profile_id: String,
    pub scheduled_for: DateTime<Utc>,
    pub meta: Option<Value>,
}

impl NewIntakeEvent {
    /// Checks required fields before any I/O happens.
    ///
    /// `scheduled_for` defaults to `now` when the caller did not supply one.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<ValidIntakeEvent> {
        let required = |value: &str, field: &'static str| {
            if value.trim().is_empty() {
                Err(Error::FieldRequired { field })
            } else {
                Ok(())
            }
        };
        required(&self.kind, "kind")?;
        required(&self.ref_id, "refId")?;
        required(&self.action, "action")?;
        required(&self.patient_profile_id, "patientProfileId")?;

        Ok(ValidIntakeEvent {
            kind: self.kind.parse()?,
            ref_id: self.ref_id.trim().to_string(),
            action: self.action.parse()?,
            patient_profile_id: self.patient_profile_id.trim().to_string(),
            scheduled_for: self.scheduled_for.unwrap_or(now),
            meta: self.meta.clone(),
        })
    }
}

impl ValidIntakeEvent {
    /// JSON body for `POST /intake-events`.
    pub fn to_payload(&self) -> Value {
        let mut body = json!({
            "kind": self.kind,
            "refId": self.ref_id,
            "action": self.action,
            "scheduledFor": self.scheduled_for.to_rfc3339_opts(SecondsFormat::Millis, true),
            "patientProfileId": self.patient_profile_id,
        });
        if let (Some(meta), Value::Object(map)) = (&self.meta, &mut body) {
            map.insert("meta".to_string(), meta.clone());
        }
        body
    }
}

#[cfg(test)]
#[path = "intake_tests.rs"]
mod tests;
