// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL (JSON Lines) file utilities.
//!
//! Backs the sync queue and the notification cache. Each record is one JSON
//! line; writes are fsynced and full rewrites go through a temp file and a
//! rename so a crash never leaves a half-written file behind.
//!
//! Several processes may share one file. Appends and [`update`] hold an
//! exclusive lock on a sibling `.lock` file so a rewrite never drops lines
//! another writer added after this process last read the file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Appends a record to a JSONL file with fsync for durability.
pub fn append<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let _lock = lock(path)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let json = serde_json::to_string(record)?;
    writeln!(file, "{json}")?;
    file.sync_all()?;

    Ok(())
}

/// Reads all records from a JSONL file.
///
/// Skips empty lines and returns an empty vec if the file doesn't exist.
/// Lines that fail to decode are logged and skipped.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(
                path = %path.display(),
                line = lineno + 1,
                error = %e,
                "skipping undecodable line"
            ),
        }
    }

    Ok(records)
}

/// Writes all records to a JSONL file, replacing existing content atomically.
pub fn write_all<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let tmp = sibling(path, ".tmp");
    {
        let mut file = File::create(&tmp)?;
        for record in records {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{json}")?;
        }
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;

    Ok(())
}

/// Read-modify-write under the file lock.
///
/// Re-reads the file, applies `f` to the current records, and writes the
/// result back. Returns the records as written along with `f`'s result.
pub fn update<T, R, F>(path: &Path, f: F) -> Result<(Vec<T>, R)>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut Vec<T>) -> R,
{
    let _lock = lock(path)?;
    let mut records = read_all(path)?;
    let out = f(&mut records);
    write_all(path, &records)?;
    Ok((records, out))
}

/// Takes an exclusive lock guarding `path`. Released when the handle drops.
fn lock(path: &Path) -> Result<File> {
    ensure_parent(path)?;
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(sibling(path, ".lock"))?;
    file.lock_exclusive()?;
    Ok(file)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
