// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entity classification and sync-state enums shared by every record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The kind of record tracked by the local store.
///
/// Each entity type is its own namespace: ids only need to be unique within
/// one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    Medication,
    Appointment,
    Treatment,
    Note,
    IntakeEvent,
    Notification,
}

impl EntityType {
    /// Every entity type, in a stable order.
    pub const ALL: [EntityType; 6] = [
        EntityType::Medication,
        EntityType::Appointment,
        EntityType::Treatment,
        EntityType::Note,
        EntityType::IntakeEvent,
        EntityType::Notification,
    ];

    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Medication => "medication",
            EntityType::Appointment => "appointment",
            EntityType::Treatment => "treatment",
            EntityType::Note => "note",
            EntityType::IntakeEvent => "intakeEvent",
            EntityType::Notification => "notification",
        }
    }

    /// REST collection path for this entity type.
    pub fn resource(&self) -> &'static str {
        match self {
            EntityType::Medication => "/medications",
            EntityType::Appointment => "/appointments",
            EntityType::Treatment => "/treatments",
            EntityType::Note => "/notes",
            EntityType::IntakeEvent => "/intake-events",
            EntityType::Notification => "/notifications",
        }
    }

    /// Payload field (and query parameter) naming the owning profile.
    ///
    /// Notifications belong to a user account; everything else belongs to a
    /// patient profile.
    pub fn owner_field(&self) -> &'static str {
        match self {
            EntityType::Notification => "userId",
            _ => "patientProfileId",
        }
    }

    /// Whether local cleanup may drop confirmed records of this type.
    pub fn is_prunable(&self) -> bool {
        matches!(
            self,
            EntityType::Medication | EntityType::Appointment | EntityType::Treatment
        )
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "medication" | "medications" => Ok(EntityType::Medication),
            "appointment" | "appointments" => Ok(EntityType::Appointment),
            "treatment" | "treatments" => Ok(EntityType::Treatment),
            "note" | "notes" => Ok(EntityType::Note),
            "intakeevent" | "intakeevents" | "intake-event" | "intake-events" => {
                Ok(EntityType::IntakeEvent)
            }
            "notification" | "notifications" => Ok(EntityType::Notification),
            _ => Err(Error::InvalidEntityType(s.to_string())),
        }
    }
}

/// Server-confirmation state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Written locally, waiting for the server.
    Pending,
    /// Confirmed by the server.
    Synced,
    /// Gave up after exhausting retries; eligible for manual retry.
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(SyncStatus::Pending),
            "synced" => Ok(SyncStatus::Synced),
            "failed" => Ok(SyncStatus::Failed),
            _ => Err(Error::InvalidSyncStatus(s.to_string())),
        }
    }
}

/// Mutation kind carried by a sync queue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncAction {
    Create,
    Update,
    Delete,
    /// Mark a notification as read.
    Read,
    /// Archive a notification.
    Archive,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Create => "CREATE",
            SyncAction::Update => "UPDATE",
            SyncAction::Delete => "DELETE",
            SyncAction::Read => "READ",
            SyncAction::Archive => "ARCHIVE",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "CREATE" => Ok(SyncAction::Create),
            "UPDATE" => Ok(SyncAction::Update),
            "DELETE" => Ok(SyncAction::Delete),
            "READ" => Ok(SyncAction::Read),
            "ARCHIVE" => Ok(SyncAction::Archive),
            _ => Err(Error::InvalidSyncAction(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
