// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Handles shared by the drain engine and the reconciliation engine.

use std::sync::Arc;

use medsync_core::{ClockSource, LocalStore, NotificationCache};
use tokio::sync::Mutex;

use super::backoff::Delay;
use super::connectivity::Connectivity;
use super::gateway::Gateway;
use super::locks::RecordLocks;
use super::queue::SyncQueue;
use crate::session::Session;

pub type SharedStore = Arc<Mutex<LocalStore>>;
pub type SharedQueue = Arc<Mutex<SyncQueue>>;
pub type SharedNotifications = Arc<Mutex<NotificationCache>>;

/// Everything a sync component needs to reach local state and the server.
///
/// Cloning is cheap; all clones share the same store, queue, and locks.
#[derive(Clone)]
pub struct SyncContext {
    pub store: SharedStore,
    pub queue: SharedQueue,
    pub notifications: SharedNotifications,
    pub gateway: Arc<dyn Gateway>,
    pub connectivity: Arc<dyn Connectivity>,
    pub delay: Arc<dyn Delay>,
    pub clock: Arc<dyn ClockSource>,
    pub locks: Arc<RecordLocks>,
    pub session: Session,
}

impl SyncContext {
    /// Bearer token for the current session.
    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }
}
