// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Abstract transport layer for serial Modbus communication.
//!
//! [`SerialTransport`] is the seam between the poll engine and the wire.
//! The production implementation is [`RtuTransport`](crate::rtu::RtuTransport);
//! tests substitute a scripted mock.

use std::fmt;

use async_trait::async_trait;

use crate::error::TransportResult;

// =============================================================================
// TransportState
// =============================================================================

/// Connection state of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportState {
    /// No connection established.
    #[default]
    Disconnected,
    /// Connection establishment in progress.
    Connecting,
    /// Connected and ready for requests.
    Connected,
    /// The last operation failed; a reconnect is required.
    Error,
}

impl TransportState {
    /// Returns `true` if the transport can accept requests.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// SerialTransport Trait
// =============================================================================

/// Abstract serial Modbus transport.
///
/// The ventilation unit exposes only 16-bit registers, so the surface is
/// deliberately small: range reads of the two register banks and a single
/// register write. All operations must apply the configured request timeout
/// internally; an operation never hangs indefinitely.
///
/// # Concurrency
///
/// Implementations must be `Send`, but the transport itself is not
/// required to serialize callers: the poll engine owns the single bus lock
/// and guarantees at most one in-flight operation.
#[async_trait]
pub trait SerialTransport: Send {
    /// Establishes the serial connection.
    ///
    /// Idempotent: connecting while connected is a no-op.
    async fn connect(&mut self) -> TransportResult<()>;

    /// Closes the serial connection.
    async fn disconnect(&mut self) -> TransportResult<()>;

    /// Returns `true` if the transport is connected.
    fn is_connected(&self) -> bool;

    /// Returns the current transport state.
    fn state(&self) -> TransportState;

    /// Reads `count` holding registers starting at `address` (FC 03).
    async fn read_holding_registers(&mut self, address: u16, count: u16)
        -> TransportResult<Vec<u16>>;

    /// Reads `count` input registers starting at `address` (FC 04).
    async fn read_input_registers(&mut self, address: u16, count: u16)
        -> TransportResult<Vec<u16>>;

    /// Writes a single holding register (FC 06).
    async fn write_single_register(&mut self, address: u16, value: u16) -> TransportResult<()>;

    /// Returns the unit id (slave address) requests are issued against.
    fn unit_id(&self) -> u8;

    /// Returns a display name for logging.
    fn display_name(&self) -> String;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_state() {
        assert!(TransportState::Connected.is_connected());
        assert!(!TransportState::Disconnected.is_connected());
        assert!(!TransportState::Error.is_connected());
        assert_eq!(TransportState::default(), TransportState::Disconnected);
    }

    #[test]
    fn test_transport_state_display() {
        assert_eq!(TransportState::Connected.to_string(), "connected");
        assert_eq!(TransportState::Error.to_string(), "error");
    }
}
