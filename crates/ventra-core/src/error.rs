// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error taxonomy for the poll engine and write gateway.
//!
//! The taxonomy is closed: connectivity failures abort a whole poll cycle,
//! batch failures degrade only their own keys, write failures are reported
//! to the caller, and anything unclassified funnels through
//! [`EngineError::Unexpected`] instead of widening the catch surface.

use thiserror::Error;
use ventra_modbus::TransportError;

use crate::catalog::Bank;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// EngineError
// =============================================================================

/// Errors produced by the poll engine and write gateway.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The serial connection could not be established; the poll cycle is
    /// abandoned and the previous snapshot stays in place.
    #[error("connectivity failure: {0}")]
    Connectivity(#[source] TransportError),

    /// A register range could not be read after all attempts. Absorbed by
    /// the engine per batch; surfaces only in logs and absence markers.
    #[error("batch read failed ({bank} {start}+{count}): {source}")]
    BatchRead {
        /// Register bank of the failed batch.
        bank: Bank,
        /// First address of the batch.
        start: u16,
        /// Register count of the batch.
        count: u16,
        /// Final attempt's failure.
        #[source]
        source: TransportError,
    },

    /// The device answered a range read with fewer words than requested.
    #[error("short response for {bank} {start}+{count}: expected {expected} words, got {actual}")]
    ShortResponse {
        /// Register bank of the batch.
        bank: Bank,
        /// First address of the batch.
        start: u16,
        /// Register count of the batch.
        count: u16,
        /// Number of words requested.
        expected: usize,
        /// Number of words received.
        actual: usize,
    },

    /// A single-register write failed or timed out. Never retried.
    #[error("write to register {address} failed: {source}")]
    Write {
        /// Target register address.
        address: u16,
        /// Underlying failure.
        #[source]
        source: TransportError,
    },

    /// Catch-all for failures outside the per-batch retry loop.
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl EngineError {
    /// Returns `true` if the underlying transport reported a lost or absent
    /// connection, meaning a reconnect is required before the next operation.
    pub fn is_connection_loss(&self) -> bool {
        match self {
            Self::Connectivity(e) => e.is_connection_loss(),
            Self::BatchRead { source, .. } | Self::Write { source, .. } => {
                source.is_connection_loss()
            }
            Self::ShortResponse { .. } | Self::Unexpected(_) => false,
        }
    }

    /// Returns `true` if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connectivity(e) => e.is_retryable(),
            Self::BatchRead { source, .. } => source.is_retryable(),
            Self::ShortResponse { .. } => true,
            Self::Write { .. } | Self::Unexpected(_) => false,
        }
    }
}

// =============================================================================
// CatalogError
// =============================================================================

/// Errors detected while validating a register catalog at construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two specs share the same snapshot key.
    #[error("duplicate snapshot key {key:?}")]
    DuplicateKey {
        /// The colliding key.
        key: &'static str,
    },

    /// Two specs alias the same register word with incompatible decode rules.
    #[error("ambiguous alias at {bank} register {address}: numeric scales differ")]
    AmbiguousAlias {
        /// Register bank.
        bank: Bank,
        /// Register address.
        address: u16,
    },

    /// A computed batch exceeds the per-request register limit.
    #[error("batch {bank} {start}+{count} exceeds the {max} register limit")]
    BatchTooLarge {
        /// Register bank.
        bank: Bank,
        /// First address of the batch.
        start: u16,
        /// Register count of the batch.
        count: u16,
        /// Configured limit.
        max: u16,
    },

    /// A spec landed in a slot whose offset does not match its address.
    #[error("slot mismatch: {key:?} at address {address} mapped to batch offset {offset} of start {start}")]
    SlotMismatch {
        /// The misplaced key.
        key: &'static str,
        /// Address declared by the spec.
        address: u16,
        /// Batch start address.
        start: u16,
        /// Offset the spec was placed at.
        offset: usize,
    },

    /// The catalog contains no registers.
    #[error("catalog is empty")]
    Empty,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_connectivity_is_connection_loss() {
        let err = EngineError::Connectivity(TransportError::NotConnected);
        assert!(err.is_connection_loss());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_short_response_is_retryable_but_not_loss() {
        let err = EngineError::ShortResponse {
            bank: Bank::Holding,
            start: 2000,
            count: 1,
            expected: 1,
            actual: 0,
        };
        assert!(err.is_retryable());
        assert!(!err.is_connection_loss());
    }

    #[test]
    fn test_write_never_retryable() {
        let err = EngineError::Write {
            address: 2504,
            source: TransportError::Timeout {
                operation: "write_single_register",
                timeout: Duration::from_secs(3),
            },
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_batch_error_display() {
        let err = EngineError::BatchRead {
            bank: Bank::Input,
            start: 12100,
            count: 3,
            source: TransportError::NotConnected,
        };
        let s = err.to_string();
        assert!(s.contains("12100"));
        assert!(s.contains("input"));
    }
}
