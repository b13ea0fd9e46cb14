// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! medsync - offline-first sync layer for a medication reminder client.
//!
//! Writes go to the server when it is reachable and to a durable local queue
//! when it is not; reads merge server data with records that exist only on
//! this device.
//!
//! # Main Components
//!
//! - [`SyncServices`] - wires the store, queue, gateway, and engines together
//! - [`reconcile::Reconciler`] - per-entity read merge and write policy
//! - [`sync::Drainer`] - replays queued writes with retry and backoff
//! - [`Config`] - `medsync.toml` settings
//! - [`Error`] - caller-facing error categories
//!
//! ```rust,ignore
//! use medsync::{Config, DataPaths, Session, SyncServices};
//!
//! let paths = DataPaths::resolve(None)?;
//! let session = Session::new(Some(token)).with_profile("p1");
//! let services = SyncServices::open(Config::load(&paths.root)?, &paths, session)?;
//! services.init().await?;
//! let report = services.drainer().drain().await?;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod error;
pub mod reconcile;
pub mod service;
pub mod session;
pub mod sync;

pub use cli::{
    Cli, Command, ConfigCommand, EventsCommand, NotificationFilterArgs, NotifyCommand,
    OutputFormat, RecordsCommand, ScheduleArgs,
};
pub use config::{Config, DataPaths};
pub use error::{Error, Result};
pub use service::{CleanupReport, StatusReport, SyncServices};
pub use session::Session;

/// Runs one CLI invocation.
pub async fn run(cli: Cli) -> Result<()> {
    let paths = DataPaths::resolve(cli.data_dir)?;
    let output = cli.output;

    let command = match cli.command {
        Command::Config(cmd) => return commands::config::run(&paths, cmd, output),
        other => other,
    };

    let config = Config::load(&paths.root)?;
    let mut session = Session::new(cli.token);
    session.profile_id = cli.profile.filter(|p| !p.trim().is_empty());
    session.user_id = cli.user.filter(|u| !u.trim().is_empty());
    tracing::debug!(data_dir = %paths.root.display(), ?session, "starting");

    let services = SyncServices::open(config, &paths, session)?;
    services.init().await?;

    match command {
        Command::Status => commands::status::run(&services, output).await,
        Command::Drain => commands::drain::run(&services, output).await,
        Command::Events(cmd) => commands::events::run(&services, cmd, output).await,
        Command::Records(cmd) => commands::records::run(&services, cmd, output).await,
        Command::Notify(cmd) => commands::notify::run(&services, cmd, output).await,
        Command::Cleanup { days } => commands::cleanup::run(&services, days, output).await,
        Command::Config(cmd) => commands::config::run(&paths, cmd, output),
    }
}
