// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync plumbing between the local store and the REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Drainer   │────►│   Gateway   │────►│  REST API   │
//! │  (rounds)   │◄────│   (trait)   │◄────│             │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐     ┌──────────────┐
//! │  SyncQueue  │     │ Connectivity │
//! │   (JSONL)   │     │   (trait)    │
//! └─────────────┘     └──────────────┘
//! ```
//!
//! # Features
//!
//! - Durable queue of pending mutations, fsynced on enqueue
//! - Round-based drain with exponential backoff between rounds
//! - Per-record ordering and write locks
//! - Server response envelope normalization
//! - Injectable gateway, connectivity, and delay traits for testing

pub mod api;
mod backoff;
mod connectivity;
mod context;
mod drain;
mod envelope;
mod gateway;
mod locks;
mod queue;

pub use backoff::{Backoff, Delay, TokioDelay};
pub use connectivity::{Connectivity, HttpProbe};
pub use context::{SharedNotifications, SharedQueue, SharedStore, SyncContext};
pub use drain::{DrainOutcome, DrainReport, Drainer};
pub use envelope::{normalize_list, normalize_object};
pub use gateway::{
    ApiRequest, ApiResponse, Gateway, GatewayError, GatewayResult, HttpGateway, Method,
};
pub use locks::RecordLocks;
pub use queue::{QueueError, QueueResult, SyncQueue};

#[cfg(test)]
pub(crate) mod test_helpers;




#[cfg(test)]
mod envelope_tests;


#[cfg(test)]
mod queue_tests;
