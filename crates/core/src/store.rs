// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The Local Store: durable per-entity-type record storage.
//!
//! Records live in an in-memory mirror backed by SQLite. Reads are served
//! from the mirror. Writes go to the mirror first and are then persisted; if
//! persisting fails the store logs the failure and stays memory-only for the
//! rest of the session ([`LocalStore::is_degraded`]).

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::db::Database;
use crate::entity::{EntityType, SyncStatus};
use crate::error::Result;
use crate::record::Record;

type Key = (EntityType, String);

pub struct LocalStore {
    records: BTreeMap<Key, Record>,
    db: Option<Database>,
    path: Option<PathBuf>,
    degraded: bool,
    initialized: bool,
}

impl LocalStore {
    /// Opens the SQLite file at `path`.
    ///
    /// An unopenable database is not fatal: the store starts degraded.
    pub fn open(path: &Path) -> Self {
        let (db, degraded) = match Database::open(path) {
            Ok(db) => (Some(db), false),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "record store unavailable, continuing in memory"
                );
                (None, true)
            }
        };
        LocalStore {
            records: BTreeMap::new(),
            db,
            path: Some(path.to_path_buf()),
            degraded,
            initialized: false,
        }
    }

    /// A store with no backing file.
    pub fn in_memory() -> Self {
        LocalStore {
            records: BTreeMap::new(),
            db: None,
            path: None,
            degraded: false,
            initialized: true,
        }
    }

    /// Wraps an already-open database.
    pub fn with_database(db: Database) -> Self {
        LocalStore {
            records: BTreeMap::new(),
            db: Some(db),
            path: None,
            degraded: false,
            initialized: false,
        }
    }

    /// Loads persisted records into the mirror. Idempotent.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        if let Some(db) = &self.db {
            match db.list_records(None) {
                Ok(records) => {
                    for record in records {
                        self.records
                            .insert((record.entity_type, record.id.clone()), record);
                    }
                }
                Err(e) => self.degrade("load", &e),
            }
        }
        self.initialized = true;
        tracing::debug!(records = self.records.len(), "local store initialized");
        Ok(())
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Upserts a record by `(entity_type, id)`.
    pub fn save(&mut self, record: Record) {
        self.persist(|db| db.upsert_record(&record));
        self.records
            .insert((record.entity_type, record.id.clone()), record);
    }

    pub fn get(&self, entity: EntityType, id: &str) -> Option<&Record> {
        self.records.get(&(entity, id.to_string()))
    }

    /// All records of one type belonging to `owner_id`, oldest first.
    pub fn get_all(&self, entity: EntityType, owner_id: &str) -> Vec<Record> {
        self.of_type(entity)
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect()
    }

    /// Records of one type that have not reached the server.
    pub fn offline_records(&self, entity: EntityType, owner_id: &str) -> Vec<Record> {
        self.of_type(entity)
            .filter(|r| r.owner_id == owner_id && r.is_offline)
            .cloned()
            .collect()
    }

    /// Removes a record. Deleting a missing record is not an error.
    pub fn delete(&mut self, entity: EntityType, id: &str) -> bool {
        self.persist(|db| db.delete_record(entity, id).map(|_| ()));
        self.records.remove(&(entity, id.to_string())).is_some()
    }

    /// Marks a record confirmed by the server. Returns false if absent.
    pub fn mark_synced(&mut self, entity: EntityType, id: &str, now: DateTime<Utc>) -> bool {
        self.update(entity, id, |r| r.mark_synced(now))
    }

    /// Marks a record as abandoned after exhausting retries. Returns false if absent.
    pub fn mark_failed(&mut self, entity: EntityType, id: &str, now: DateTime<Utc>) -> bool {
        self.update(entity, id, |r| r.mark_failed(now))
    }

    /// Applies `f` to a stored record and persists the result.
    pub fn update<F>(&mut self, entity: EntityType, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Record),
    {
        let Some(record) = self.records.get_mut(&(entity, id.to_string())) else {
            return false;
        };
        f(record);
        let record = record.clone();
        self.persist(|db| db.upsert_record(&record));
        true
    }

    /// Deletes confirmed medications, appointments, and treatments created
    /// before `cutoff`. Anything still pending, failed, or offline is kept
    /// regardless of age. Returns the number removed.
    pub fn prune_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let stale: Vec<Key> = self
            .records
            .iter()
            .filter(|((entity, _), r)| {
                entity.is_prunable()
                    && !r.is_offline
                    && r.sync_status == SyncStatus::Synced
                    && r.created_at < cutoff
            })
            .map(|(k, _)| k.clone())
            .collect();
        for (entity, id) in &stale {
            self.delete(*entity, id);
        }
        if !stale.is_empty() {
            tracing::info!(removed = stale.len(), cutoff = %cutoff, "pruned old records");
        }
        stale.len()
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.persist(|db| db.clear_records());
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn of_type(&self, entity: EntityType) -> impl Iterator<Item = &Record> {
        let mut records: Vec<&Record> = self
            .records
            .values()
            .filter(move |r| r.entity_type == entity)
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        records.into_iter()
    }

    fn persist<F>(&mut self, op: F)
    where
        F: FnOnce(&Database) -> Result<()>,
    {
        if self.degraded {
            return;
        }
        let Some(db) = &self.db else {
            return;
        };
        if let Err(e) = op(db) {
            self.degrade("write", &e);
        }
    }

    fn degrade(&mut self, op: &str, err: &crate::error::Error) {
        tracing::warn!(
            op,
            error = %err,
            "record store failed, continuing in memory for this session"
        );
        self.degraded = true;
        self.db = None;
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
