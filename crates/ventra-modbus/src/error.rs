// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the Modbus RTU transport.
//!
//! Every failure a bus operation can produce is mapped into [`TransportError`]
//! in one place ([`crate::rtu`]); callers never see `tokio-modbus` or
//! `tokio-serial` error types directly.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

// =============================================================================
// TransportError
// =============================================================================

/// Errors produced by the serial Modbus transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The serial device node does not exist.
    #[error("serial port {port} not found")]
    PortNotFound {
        /// Serial port path.
        port: String,
    },

    /// The serial device exists but could not be opened.
    #[error("access denied opening serial port {port}")]
    AccessDenied {
        /// Serial port path.
        port: String,
    },

    /// The port was found but could not be configured.
    #[error("failed to configure serial port {port}: {message}")]
    PortSetup {
        /// Serial port path.
        port: String,
        /// Underlying failure description.
        message: String,
    },

    /// An operation was attempted without an established connection.
    #[error("not connected")]
    NotConnected,

    /// The connection dropped mid-operation.
    #[error("serial connection lost: {0}")]
    ConnectionLost(String),

    /// An operation did not complete within its deadline.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        /// Name of the bus operation.
        operation: &'static str,
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The device answered with a Modbus exception response.
    #[error("device exception 0x{code:02X} ({})", exception_name(*code))]
    Exception {
        /// Raw Modbus exception code.
        code: u8,
    },

    /// A low-level I/O failure not covered by the cases above.
    #[error("{operation} failed: {source}")]
    Io {
        /// Name of the bus operation.
        operation: &'static str,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The transport configuration was rejected.
    #[error("invalid transport configuration: {0}")]
    Configuration(String),
}

impl TransportError {
    /// Returns `true` if a retry of the same operation may succeed.
    ///
    /// Exception responses and configuration errors are deterministic and
    /// never retried; everything else is treated as transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::Exception { .. } | Self::Configuration(_) | Self::AccessDenied { .. }
        )
    }

    /// Returns `true` if the error indicates the connection is gone and a
    /// reconnect is required before further operations.
    pub fn is_connection_loss(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::ConnectionLost(_)
                | Self::PortNotFound { .. }
                | Self::AccessDenied { .. }
                | Self::PortSetup { .. }
        )
    }
}

/// Human-readable name for a Modbus exception code.
pub fn exception_name(code: u8) -> &'static str {
    match code {
        0x01 => "Illegal Function",
        0x02 => "Illegal Data Address",
        0x03 => "Illegal Data Value",
        0x04 => "Server Device Failure",
        0x05 => "Acknowledge",
        0x06 => "Server Device Busy",
        0x08 => "Memory Parity Error",
        0x0A => "Gateway Path Unavailable",
        0x0B => "Gateway Target Device Failed to Respond",
        _ => "Unknown Exception",
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        assert!(TransportError::NotConnected.is_retryable());
        assert!(TransportError::Timeout {
            operation: "read_holding_registers",
            timeout: Duration::from_secs(3),
        }
        .is_retryable());
        assert!(!TransportError::Exception { code: 0x02 }.is_retryable());
        assert!(!TransportError::Configuration("bad baud".into()).is_retryable());
    }

    #[test]
    fn test_connection_loss_classification() {
        assert!(TransportError::NotConnected.is_connection_loss());
        assert!(TransportError::ConnectionLost("EIO".into()).is_connection_loss());
        assert!(!TransportError::Exception { code: 0x04 }.is_connection_loss());
        assert!(!TransportError::Timeout {
            operation: "write_single_register",
            timeout: Duration::from_secs(3),
        }
        .is_connection_loss());
    }

    #[test]
    fn test_exception_display() {
        let err = TransportError::Exception { code: 0x02 };
        assert_eq!(err.to_string(), "device exception 0x02 (Illegal Data Address)");
    }

    #[test]
    fn test_exception_name_unknown() {
        assert_eq!(exception_name(0x7F), "Unknown Exception");
    }
}
