// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Caller identity: the bearer token and the profiles it acts for.
//!
//! Token storage and refresh live outside this crate; a session is just the
//! values handed in at startup.

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    /// Patient profile that owns medications, appointments, treatments, notes, and intake events.
    pub profile_id: Option<String>,
    /// User account that owns notifications.
    pub user_id: Option<String>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Session {
            token: token.filter(|t| !t.trim().is_empty()),
            profile_id: None,
            user_id: None,
        }
    }

    pub fn with_profile(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

// Keep the token out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("profile_id", &self.profile_id)
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
