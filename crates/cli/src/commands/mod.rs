// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod cleanup;
pub mod config;
pub mod drain;
pub mod events;
pub mod notify;
pub mod records;
pub mod status;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::session::Session;

/// Patient profile from `--profile` / `MEDSYNC_PROFILE`.
pub(crate) fn require_profile(session: &Session) -> Result<&str> {
    session.profile_id.as_deref().ok_or_else(|| {
        Error::Validation(
            "no patient profile selected\n  hint: pass --profile or set MEDSYNC_PROFILE"
                .to_string(),
        )
    })
}

/// User account from `--user` / `MEDSYNC_USER`.
pub(crate) fn require_user(session: &Session) -> Result<&str> {
    session.user_id.as_deref().ok_or_else(|| {
        Error::Validation(
            "no user selected\n  hint: pass --user or set MEDSYNC_USER".to_string(),
        )
    })
}

/// Parses a command-line argument that must hold a JSON object.
pub(crate) fn parse_object(raw: &str, what: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| Error::Validation(format!("{what} is not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(Error::Validation(format!("{what} must be a JSON object")));
    }
    Ok(value)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
