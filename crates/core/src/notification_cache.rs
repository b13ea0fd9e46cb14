// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Locally cached notification list, persisted as JSONL.
//!
//! Kept apart from the record store: it holds full [`Notification`] objects
//! as last seen from the server, plus ones created on the device.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::id::is_local_id;
use crate::jsonl;
use crate::notification::Notification;

pub struct NotificationCache {
    path: Option<PathBuf>,
    items: Vec<Notification>,
}

impl NotificationCache {
    pub fn open(path: &Path) -> Result<Self> {
        let items = jsonl::read_all(path)?;
        Ok(NotificationCache {
            path: Some(path.to_path_buf()),
            items,
        })
    }

    pub fn in_memory() -> Self {
        NotificationCache {
            path: None,
            items: Vec::new(),
        }
    }

    pub fn list(&self) -> &[Notification] {
        &self.items
    }

    pub fn for_user(&self, user_id: &str) -> Vec<Notification> {
        self.items
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    /// Inserts or replaces by id.
    pub fn upsert(&mut self, notification: Notification) -> Result<()> {
        self.mutate(|items| put(items, notification))
    }

    /// Upserts many at once with a single write.
    pub fn upsert_all(&mut self, notifications: Vec<Notification>) -> Result<()> {
        self.mutate(|items| {
            for notification in notifications {
                put(items, notification);
            }
        })
    }

    /// Applies `f` to a cached notification. Returns false if absent.
    pub fn update<F>(&mut self, id: &str, f: F) -> Result<bool>
    where
        F: FnOnce(&mut Notification),
    {
        self.mutate(|items| match items.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                f(notification);
                true
            }
            None => false,
        })
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        self.mutate(|items| {
            let before = items.len();
            items.retain(|n| n.id != id);
            items.len() != before
        })
    }

    /// Swaps a device-created entry for the server's copy.
    pub fn replace(&mut self, old_id: &str, notification: Notification) -> Result<()> {
        self.mutate(|items| {
            items.retain(|n| n.id != old_id);
            put(items, notification);
        })
    }

    /// Drops server-known entries created before `cutoff`. Device-created
    /// entries are kept until they sync.
    pub fn prune_older_than(&mut self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.mutate(|items| {
            let before = items.len();
            items.retain(|n| is_local_id(&n.id) || n.created_at >= cutoff);
            before - items.len()
        })
    }

    pub fn clear(&mut self) -> Result<()> {
        self.mutate(|items| items.clear())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read-modify-write against the file so entries written by other
    /// processes since `open` are kept.
    fn mutate<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<Notification>) -> R,
    {
        let Some(path) = &self.path else {
            return Ok(f(&mut self.items));
        };
        let (items, out) = jsonl::update(path, f)?;
        self.items = items;
        Ok(out)
    }
}

fn put(items: &mut Vec<Notification>, notification: Notification) {
    match items.iter_mut().find(|n| n.id == notification.id) {
        Some(existing) => *existing = notification,
        None => items.push(notification),
    }
}

#[cfg(test)]
#[path = "notification_cache_tests.rs"]
mod tests;
