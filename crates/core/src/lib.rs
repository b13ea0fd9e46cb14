// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! medsync-core: data model and local persistence for medsync
//!
//! This crate provides the record model, entity enums, id generation, and the
//! SQLite-backed Local Store used by the medsync sync engine and CLI.

pub mod clock;
pub mod db;
pub mod entity;
pub mod error;
pub mod id;
pub mod intake;
pub mod jsonl;
pub mod notification;
pub mod notification_cache;
pub mod queue_item;
pub mod record;
pub mod store;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use db::Database;
pub use entity::{EntityType, SyncAction, SyncStatus};
pub use error::{Error, Result};
pub use intake::{IntakeAction, IntakeKind, NewIntakeEvent, ValidIntakeEvent};
pub use notification::{
    NewNotification, Notification, NotificationFilter, NotificationStats, NotificationStatus,
    NotificationType, Priority,
};
pub use notification_cache::NotificationCache;
pub use queue_item::SyncQueueItem;
pub use record::Record;
pub use store::LocalStore;
