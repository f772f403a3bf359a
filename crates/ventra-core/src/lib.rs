// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ventra-core
//!
//! Register polling and decoding engine for the VENTRA ventilation adapter.
//!
//! The crate is organized around one data path:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      PollCoordinator                      │
//! │          (interval ticks + out-of-band refreshes)         │
//! └───────────────────────────────────────────────────────────┘
//!                │                                 │
//!                ▼                                 ▼
//! ┌─────────────────────────┐       ┌─────────────────────────┐
//! │        PollEngine       │       │       WriteGateway      │
//! │ (batch reads + decode)  │       │  (fail-fast FC06 write) │
//! └─────────────────────────┘       └─────────────────────────┘
//!                │        exclusive bus lock       │
//!                └────────────────┬────────────────┘
//!                                 ▼
//!                   ┌─────────────────────────┐
//!                   │   dyn SerialTransport   │
//!                   └─────────────────────────┘
//! ```
//!
//! - **Catalog**: [`catalog::RegisterCatalog`] validates the register table
//!   and plans contiguous range reads at construction
//! - **Engine**: [`engine::PollEngine`] produces one immutable
//!   [`snapshot::Snapshot`] per cycle, tolerating per-batch failures
//! - **Gateway**: [`engine::WriteGateway`] serializes writes on the same
//!   bus lock
//! - **Coordinator**: [`coordinator::PollCoordinator`] schedules cycles and
//!   publishes snapshots to consumers
//!
//! The built-in SAVE VSR register map lives in [`registers`].

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod registers;
pub mod snapshot;

pub use catalog::{Bank, BatchSpec, Decode, RegisterCatalog, RegisterSpec, Value, MAX_BATCH_LEN};
pub use coordinator::{CoordinatorHandle, PollCoordinator, DEFAULT_POLL_INTERVAL};
pub use engine::{Bus, PollEngine, PollSettings, SharedBus, WriteGateway};
pub use error::{CatalogError, EngineError, EngineResult};
pub use registers::vsr_catalog;
pub use snapshot::{Snapshot, SnapshotBuilder, SnapshotStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
