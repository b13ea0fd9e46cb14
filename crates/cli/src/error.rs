// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{GatewayError, QueueError};

/// Caller-facing errors from the medsync library.
///
/// Write paths surface these so the user can be told what went wrong:
/// bad input, no network, a rejected credential, or a server failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no internet connection: {0}")]
    Connectivity(String),

    #[error("authentication failed: {0}\n  hint: refresh the access token (MEDSYNC_TOKEN)")]
    Auth(String),

    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected server response: {0}")]
    Protocol(String),

    #[error(transparent)]
    Core(#[from] medsync_core::Error),

    #[error("sync queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Maps a core input error onto the validation category.
    pub fn validation(err: medsync_core::Error) -> Self {
        match err {
            medsync_core::Error::FieldRequired { .. }
            | medsync_core::Error::InvalidEntityType(_)
            | medsync_core::Error::InvalidIntakeKind(_)
            | medsync_core::Error::InvalidIntakeAction(_)
            | medsync_core::Error::InvalidNotificationType(_)
            | medsync_core::Error::InvalidPriority(_)
            | medsync_core::Error::InvalidNotificationStatus(_) => {
                Error::Validation(err.to_string())
            }
            other => Error::Core(other),
        }
    }
}

impl From<GatewayError> for Error {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Network(msg) => Error::Connectivity(msg),
            GatewayError::Timeout => Error::Connectivity("request timed out".to_string()),
            GatewayError::Unauthorized { status } => {
                Error::Auth(format!("server answered {status}"))
            }
            GatewayError::NotFound => Error::NotFound("resource".to_string()),
            GatewayError::Server { status } => Error::Server {
                status,
                message: "server failure".to_string(),
            },
            GatewayError::Rejected { status, message } => Error::Rejected { status, message },
            GatewayError::Decode(msg) => Error::Protocol(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
