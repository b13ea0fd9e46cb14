// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync queue: pending mutations persisted as JSONL.
//!
//! Each enqueue is appended and fsynced immediately; removals and retry
//! updates re-read the file under its lock and rewrite it atomically, so
//! items other processes enqueued meanwhile survive. Items keep insertion
//! order across entity types.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use medsync_core::{jsonl, EntityType, SyncAction, SyncQueueItem};
use serde_json::Value;

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Persisting or reading the queue file failed.
    #[error("storage error: {0}")]
    Storage(#[from] medsync_core::Error),

    /// No item with this id.
    #[error("queue item not found: {0}")]
    NotFound(String),
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// The shared, ordered list of pending mutations.
pub struct SyncQueue {
    /// Path to the queue file; `None` keeps the queue in memory.
    path: Option<PathBuf>,
    items: Vec<SyncQueueItem>,
}

impl SyncQueue {
    /// Create or open a queue at the given path.
    pub fn open(path: &Path) -> QueueResult<Self> {
        let items = jsonl::read_all(path)?;
        Ok(SyncQueue {
            path: Some(path.to_path_buf()),
            items,
        })
    }

    pub fn in_memory() -> Self {
        SyncQueue {
            path: None,
            items: Vec::new(),
        }
    }

    /// Re-reads the file, picking up items written by other processes.
    pub fn reload(&mut self) -> QueueResult<()> {
        if let Some(path) = &self.path {
            self.items = jsonl::read_all(path)?;
        }
        Ok(())
    }

    /// Appends a mutation. The item is on disk before this returns.
    pub fn enqueue(
        &mut self,
        id: String,
        action: SyncAction,
        entity_type: EntityType,
        target_id: &str,
        data: Value,
        now: DateTime<Utc>,
    ) -> QueueResult<SyncQueueItem> {
        let item = SyncQueueItem::new(id, action, entity_type, target_id, data, now);
        if let Some(path) = &self.path {
            jsonl::append(path, &item)?;
        }
        tracing::debug!(
            id = %item.id,
            action = %item.action,
            entity = %item.entity_type,
            target = %item.target_id,
            "enqueued"
        );
        self.items.push(item.clone());
        Ok(item)
    }

    /// Copy of the current items in insertion order.
    pub fn snapshot(&self) -> Vec<SyncQueueItem> {
        self.items.clone()
    }

    pub fn get(&self, id: &str) -> Option<&SyncQueueItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items touching one record.
    pub fn items_for(&self, entity: EntityType, target_id: &str) -> Vec<SyncQueueItem> {
        self.items
            .iter()
            .filter(|i| i.target() == (entity, target_id))
            .cloned()
            .collect()
    }

    /// Removes an item. Returns false if it was already gone.
    pub fn remove(&mut self, id: &str) -> QueueResult<bool> {
        self.mutate(|items| {
            let before = items.len();
            items.retain(|i| i.id != id);
            items.len() != before
        })
    }

    /// Removes every item touching one record. Returns how many were removed.
    pub fn remove_for(&mut self, entity: EntityType, target_id: &str) -> QueueResult<usize> {
        self.mutate(|items| {
            let before = items.len();
            items.retain(|i| i.target() != (entity, target_id));
            before - items.len()
        })
    }

    /// Persists a new retry count for an item.
    pub fn set_retry_count(&mut self, id: &str, retry_count: u32) -> QueueResult<()> {
        let found = self.mutate(|items| match items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.retry_count = retry_count;
                true
            }
            None => false,
        })?;
        if !found {
            return Err(QueueError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Points items at a record's server id once its CREATE has landed.
    pub fn retarget(&mut self, entity: EntityType, from: &str, to: &str) -> QueueResult<usize> {
        self.mutate(|items| {
            let mut changed = 0;
            for item in items.iter_mut().filter(|i| i.target() == (entity, from)) {
                item.target_id = to.to_string();
                changed += 1;
            }
            changed
        })
    }

    /// Clear all queued items.
    pub fn clear(&mut self) -> QueueResult<()> {
        self.mutate(|items| items.clear())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Applies `f` to the items on disk, not just the ones this handle has
    /// seen, then refreshes the in-memory copy.
    fn mutate<R, F>(&mut self, f: F) -> QueueResult<R>
    where
        F: FnOnce(&mut Vec<SyncQueueItem>) -> R,
    {
        let Some(path) = &self.path else {
            return Ok(f(&mut self.items));
        };
        let (items, out) = jsonl::update(path, f)?;
        self.items = items;
        Ok(out)
    }
}
