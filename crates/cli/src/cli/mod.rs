// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use medsync_core::EntityType;

pub use args::{NotificationFilterArgs, ScheduleArgs};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn entity_type(s: &str) -> Result<EntityType, String> {
    s.parse::<EntityType>().map_err(|e| e.to_string())
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "medsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first sync client for medication and appointment reminders")]
#[command(
    long_about = "Offline-first sync client for medication and appointment reminders.\n\n\
    Writes made without a connection are stored on this device and replayed \
    against the server by `medsync drain`."
)]
pub struct Cli {
    /// Directory holding the local store, queue, and config
    #[arg(long, global = true, value_name = "path")]
    pub data_dir: Option<PathBuf>,

    /// Bearer token for the REST API
    #[arg(long, global = true, env = "MEDSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Patient profile that owns medications, appointments, treatments, notes, and events
    #[arg(long, global = true, env = "MEDSYNC_PROFILE")]
    pub profile: Option<String>,

    /// User account that owns notifications
    #[arg(long, global = true, env = "MEDSYNC_USER")]
    pub user: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(
        long = "output",
        short = 'o',
        global = true,
        value_enum,
        default_value = "text"
    )]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show connectivity, session, and pending queue counts
    Status,

    /// Replay queued offline writes against the server
    Drain,

    /// Medication intake events (online only)
    #[command(subcommand)]
    Events(EventsCommand),

    /// Medications, appointments, treatments, and notes
    #[command(subcommand)]
    Records(RecordsCommand),

    /// Notifications and reminders
    #[command(subcommand)]
    Notify(NotifyCommand),

    /// Drop confirmed local data older than N days
    Cleanup {
        /// Age threshold in days
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum EventsCommand {
    /// List intake events, latest first
    List,

    /// Record a dose as taken, snoozed, or skipped
    #[command(after_help = "\
Examples:
  medsync events register med m1 taken
  medsync events register trt t1 skipped --at 2026-03-01T08:00:00Z")]
    Register {
        /// Event kind (med, trt)
        kind: String,

        /// Medication or treatment id
        #[arg(value_parser = non_empty_string)]
        ref_id: String,

        /// Action (taken, snooze, skipped)
        action: String,

        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Extra JSON attached to the event
        #[arg(long)]
        meta: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RecordsCommand {
    /// List records, server copies merged with device-only ones
    List {
        /// medication, appointment, treatment, or note
        #[arg(value_parser = entity_type)]
        entity: EntityType,
    },

    /// Create a record from a JSON object
    #[command(after_help = "\
Examples:
  medsync records create medication '{\"name\": \"Ibuprofeno\", \"dose\": \"400mg\"}'")]
    Create {
        #[arg(value_parser = entity_type)]
        entity: EntityType,

        /// JSON object with the record fields
        payload: String,
    },

    /// Apply a JSON patch to a record
    Update {
        #[arg(value_parser = entity_type)]
        entity: EntityType,

        #[arg(value_parser = non_empty_string)]
        id: String,

        /// JSON object with the changed fields
        patch: String,
    },

    /// Delete a record
    Delete {
        #[arg(value_parser = entity_type)]
        entity: EntityType,

        #[arg(value_parser = non_empty_string)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum NotifyCommand {
    /// Create a notification, keeping a local copy if the API is down
    Create {
        /// MEDICATION_REMINDER, APPOINTMENT_REMINDER, TREATMENT_REMINDER, SYSTEM, or CUSTOM
        #[arg(long = "type", short = 't')]
        kind: String,

        #[arg(long, value_parser = non_empty_string)]
        title: String,

        #[arg(long, short, value_parser = non_empty_string)]
        message: String,

        /// LOW, MEDIUM, HIGH, or URGENT
        #[arg(long, short)]
        priority: Option<String>,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// List notifications
    List {
        #[command(flatten)]
        filter: NotificationFilterArgs,
    },

    /// Mark notification(s) as read
    #[command(arg_required_else_help = true)]
    Read {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Archive a notification
    Archive { id: String },

    /// Delete a notification
    Delete { id: String },

    /// Show notification counters
    Stats,

    /// Ask the server to purge old notifications
    Purge,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
