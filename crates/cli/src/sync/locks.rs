// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-record write locks.
//!
//! Writers to the same `(entity_type, id)` take turns; writers to different
//! records proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use medsync_core::EntityType;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Key = (EntityType, String);

#[derive(Default)]
pub struct RecordLocks {
    locks: Mutex<HashMap<Key, Arc<AsyncMutex<()>>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to one record. Released on drop.
    pub async fn lock(&self, entity: EntityType, id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries nobody holds or waits on can go.
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            Arc::clone(
                locks
                    .entry((entity, id.to_string()))
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        lock.lock_owned().await
    }

    /// Number of records currently tracked.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
