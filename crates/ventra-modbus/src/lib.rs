// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ventra-modbus
//!
//! Modbus RTU serial transport for the VENTRA ventilation adapter.
//!
//! This crate wraps `tokio-modbus` and `tokio-serial` behind the small
//! [`SerialTransport`] trait the poll engine consumes:
//!
//! - **Range reads** of holding (FC 03) and input (FC 04) registers
//! - **Single register writes** (FC 06)
//! - **Bounded operations**: every request carries an explicit timeout
//! - **Closed error taxonomy**: library and I/O failures map into
//!   [`TransportError`] in one place
//!
//! Wire framing, CRC, and inter-frame timing belong to `tokio-modbus`;
//! nothing in this crate touches the RTU encoding.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ventra_modbus::{RtuConfig, RtuTransport, SerialTransport};
//!
//! let config = RtuConfig::builder()
//!     .port("/dev/ttyUSB0")
//!     .baud_rate(9600)
//!     .unit_id(1)
//!     .build()?;
//!
//! let mut transport = RtuTransport::new(config);
//! transport.connect().await?;
//! let words = transport.read_holding_registers(2000, 1).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod rtu;
pub mod transport;
pub mod types;

pub use error::{exception_name, TransportError, TransportResult};
pub use rtu::RtuTransport;
pub use transport::{SerialTransport, TransportState};
pub use types::{
    DataBits, Parity, RtuConfig, RtuConfigBuilder, StopBits, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_UNIT_ID, MAX_BAUD_RATE, MIN_BAUD_RATE,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
