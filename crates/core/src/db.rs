// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed persistence for synced and pending records.
//!
//! Every entity type shares one `records` table keyed by `(entity_type, id)`;
//! entity-specific fields live in the JSON `payload` column.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::entity::EntityType;
use crate::error::{Error, Result};
use crate::record::Record;

/// SQL schema for the record store.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    entity_type TEXT NOT NULL,
    id TEXT NOT NULL,
    owner_id TEXT NOT NULL,
    payload TEXT NOT NULL,
    sync_status TEXT NOT NULL DEFAULT 'pending',
    is_offline INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (entity_type, id)
);

CREATE INDEX IF NOT EXISTS idx_records_owner ON records(entity_type, owner_id);
CREATE INDEX IF NOT EXISTS idx_records_created ON records(created_at);
"#;

const RECORD_COLUMNS: &str =
    "entity_type, id, owner_id, payload, sync_status, is_offline, created_at, updated_at";

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| corrupted(format!("invalid value '{value}' in column '{column}'")))
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupted(format!("invalid timestamp '{value}' in column '{column}'")))
}

fn corrupted(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(Error::CorruptedData(message)),
    )
}

fn row_to_record(row: &Row<'_>) -> std::result::Result<Record, rusqlite::Error> {
    let entity_str: String = row.get(0)?;
    let payload_str: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let created_str: String = row.get(6)?;
    let updated_str: String = row.get(7)?;

    Ok(Record {
        entity_type: parse_db(&entity_str, "entity_type")?,
        id: row.get(1)?,
        owner_id: row.get(2)?,
        payload: serde_json::from_str(&payload_str)
            .map_err(|e| corrupted(format!("invalid payload json: {e}")))?,
        sync_status: parse_db(&status_str, "sync_status")?,
        is_offline: row.get(5)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
        updated_at: parse_timestamp(&updated_str, "updated_at")?,
    })
}

/// Run schema creation on a database connection. Idempotent.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite database connection with record operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL lets a reading CLI coexist with a draining one.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Insert or replace a record.
    pub fn upsert_record(&self, record: &Record) -> Result<()> {
        let payload = serde_json::to_string(&record.payload)?;
        self.conn.execute(
            "INSERT INTO records (entity_type, id, owner_id, payload, sync_status,
             is_offline, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(entity_type, id) DO UPDATE SET
                owner_id = excluded.owner_id,
                payload = excluded.payload,
                sync_status = excluded.sync_status,
                is_offline = excluded.is_offline,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                record.entity_type.as_str(),
                record.id,
                record.owner_id,
                payload,
                record.sync_status.as_str(),
                record.is_offline,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a record by type and id.
    pub fn get_record(&self, entity: EntityType, id: &str) -> Result<Option<Record>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM records WHERE entity_type = ?1 AND id = ?2");
        let record = self
            .conn
            .query_row(&sql, params![entity.as_str(), id], row_to_record)
            .optional()?;
        Ok(record)
    }

    /// List records, optionally narrowed to one entity type, oldest first.
    pub fn list_records(&self, entity: Option<EntityType>) -> Result<Vec<Record>> {
        let mut sql = format!("SELECT {RECORD_COLUMNS} FROM records");
        let mut params_vec: Vec<String> = Vec::new();
        if let Some(entity) = entity {
            sql.push_str(" WHERE entity_type = ?");
            params_vec.push(entity.as_str().to_string());
        }
        sql.push_str(" ORDER BY created_at ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(rusqlite::params_from_iter(params_vec.iter()), row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Delete a record. Returns true if a row was removed.
    pub fn delete_record(&self, entity: EntityType, id: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM records WHERE entity_type = ?1 AND id = ?2",
            params![entity.as_str(), id],
        )?;
        Ok(affected > 0)
    }

    /// Delete every record.
    pub fn clear_records(&self) -> Result<()> {
        self.conn.execute("DELETE FROM records", [])?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
