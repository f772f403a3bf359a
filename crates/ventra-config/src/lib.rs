// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ventra-config
//!
//! Configuration schema, loading, and validation for the VENTRA adapter.
//!
//! ```no_run
//! use ventra_config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load("ventra.yaml").unwrap();
//! println!("polling {} every {:?}", config.serial.port, config.polling.interval);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader};
pub use schema::{
    LogFormat, LoggingSettings, PollingSettings, SerialSettings, VentraConfig,
    DEFAULT_POLL_INTERVAL, DEFAULT_READ_ATTEMPTS, DEFAULT_READ_BACKOFF, MAX_POLL_INTERVAL,
    MIN_POLL_INTERVAL,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
