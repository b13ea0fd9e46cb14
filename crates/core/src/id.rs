// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Locally generated identifiers.
//!
//! Server ids are opaque strings. Ids minted on the device carry a prefix,
//! the creation time in milliseconds, and a random numeric suffix:
//! `local_1712345678901_482913`. The prefix keeps them distinguishable from
//! server ids; the suffix avoids collisions within one millisecond.

use rand::Rng;

use crate::clock::ClockSource;

/// Prefix for records created on the device.
pub const LOCAL_PREFIX: &str = "local";
/// Prefix for sync queue items.
pub const QUEUE_PREFIX: &str = "sync";

/// Generate `{prefix}_{millis}_{random}`.
pub fn generate_id<C: ClockSource>(prefix: &str, clock: &C) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}_{}_{}", prefix, clock.now_ms(), suffix)
}

/// Generate an id for a record created while the server is unreachable.
pub fn local_record_id<C: ClockSource>(clock: &C) -> String {
    generate_id(LOCAL_PREFIX, clock)
}

/// Generate an id for a sync queue item.
pub fn queue_item_id<C: ClockSource>(clock: &C) -> String {
    generate_id(QUEUE_PREFIX, clock)
}

/// Returns true if the id was minted on the device (`local_<digits>_<digits>`).
pub fn is_local_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix(LOCAL_PREFIX).and_then(|r| r.strip_prefix('_')) else {
        return false;
    };
    let mut parts = rest.split('_');
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(ms), Some(rand), None) if all_digits(ms) && all_digits(rand)
    )
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
