// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.
//!
//! These structs are used with `#[command(flatten)]` to reduce duplication
//! across commands that share flags.

use chrono::{DateTime, Utc};
use clap::Args;

/// When a dose or reminder is due.
#[derive(Args, Clone, Debug, Default)]
pub struct ScheduleArgs {
    /// RFC 3339 timestamp (defaults to now)
    #[arg(long = "at", value_name = "TIME")]
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Notification list filters.
#[derive(Args, Clone, Debug)]
pub struct NotificationFilterArgs {
    /// UNREAD, READ, or ARCHIVED
    #[arg(long, short)]
    pub status: Option<String>,

    /// LOW, MEDIUM, HIGH, or URGENT
    #[arg(long, short)]
    pub priority: Option<String>,

    /// Notification type
    #[arg(long = "type", short = 't')]
    pub kind: Option<String>,

    /// Match title or message text
    #[arg(long, short = 'q')]
    pub search: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, short = 'n', default_value_t = 20)]
    pub limit: u32,
}
