// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for medsync-core operations.

use thiserror::Error;

/// All possible errors that can occur in medsync-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid entity type: '{0}'\n  hint: valid types are: medication, appointment, treatment, note, intakeEvent, notification")]
    InvalidEntityType(String),

    #[error("invalid sync status: '{0}'\n  hint: valid statuses are: pending, synced, failed")]
    InvalidSyncStatus(String),

    #[error("invalid sync action: '{0}'\n  hint: valid actions are: CREATE, UPDATE, DELETE, READ, ARCHIVE")]
    InvalidSyncAction(String),

    #[error("invalid intake kind: '{0}'\n  hint: valid kinds are: MED, TRT")]
    InvalidIntakeKind(String),

    #[error("invalid intake action: '{0}'\n  hint: valid actions are: TAKEN, SNOOZE, SKIPPED")]
    InvalidIntakeAction(String),

    #[error("invalid notification type: '{0}'")]
    InvalidNotificationType(String),

    #[error("invalid notification priority: '{0}'\n  hint: valid priorities are: LOW, MEDIUM, HIGH, URGENT")]
    InvalidPriority(String),

    #[error("invalid notification status: '{0}'\n  hint: valid statuses are: UNREAD, READ, ARCHIVED")]
    InvalidNotificationStatus(String),

    #[error("{field} is required")]
    FieldRequired { field: &'static str },

    #[error("record not found: {entity} {id}")]
    RecordNotFound { entity: String, id: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for medsync-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
