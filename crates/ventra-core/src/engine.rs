// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The poll engine and write gateway.
//!
//! Both components share one [`Bus`]: a `tokio::sync::Mutex` wrapping the
//! serial transport. The serial link is half-duplex with a single device on
//! it, so the mutex is the correctness mechanism, not an optimization: any
//! interleaving of two in-flight request/response exchanges corrupts both.
//! The lock is held across the entire multi-step operation, including
//! connection establishment, never just the low-level transport call.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::timeout;
use ventra_modbus::{SerialTransport, TransportError};

use crate::catalog::{Bank, BatchSpec, RegisterCatalog};
use crate::error::{EngineError, EngineResult};
use crate::snapshot::{Snapshot, SnapshotBuilder};

// =============================================================================
// Bus
// =============================================================================

/// The exclusive-access wrapper around the serial transport.
///
/// Exactly one bus exists per device. Everything that talks to the wire
/// (connect, every batch read, every write) goes through `transport.lock()`.
pub struct Bus {
    transport: Mutex<Box<dyn SerialTransport>>,
}

/// Shared handle to the bus.
pub type SharedBus = Arc<Bus>;

impl Bus {
    /// Wraps a transport into a shared bus.
    pub fn new(transport: impl SerialTransport + 'static) -> SharedBus {
        Arc::new(Self {
            transport: Mutex::new(Box::new(transport)),
        })
    }

    /// Locks the transport for exclusive access.
    pub(crate) async fn lock(&self) -> tokio::sync::MutexGuard<'_, Box<dyn SerialTransport>> {
        self.transport.lock().await
    }

    /// Closes the serial connection, waiting for any in-flight operation.
    pub async fn shutdown(&self) {
        let mut transport = self.transport.lock().await;
        if let Err(e) = transport.disconnect().await {
            tracing::warn!(error = %e, "error closing transport during shutdown");
        }
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus").finish_non_exhaustive()
    }
}

// =============================================================================
// PollSettings
// =============================================================================

/// Tuning knobs for the poll engine.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Total attempts per batch read (first try included).
    pub attempts: u32,
    /// Delay between attempts of the same batch.
    pub backoff: Duration,
    /// Deadline for (re)establishing the serial connection.
    pub connect_timeout: Duration,
    /// Close the serial port after every poll cycle instead of keeping it
    /// open with lazy reconnect.
    pub close_after_poll: bool,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            attempts: 2,
            backoff: Duration::from_millis(500),
            connect_timeout: Duration::from_secs(5),
            close_after_poll: false,
        }
    }
}

// =============================================================================
// Connection handling
// =============================================================================

async fn ensure_connected(
    transport: &mut dyn SerialTransport,
    connect_timeout: Duration,
) -> EngineResult<()> {
    if transport.is_connected() {
        return Ok(());
    }

    tracing::debug!(transport = %transport.display_name(), "connecting");
    match timeout(connect_timeout, transport.connect()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(EngineError::Connectivity(e)),
        Err(_) => Err(EngineError::Connectivity(TransportError::Timeout {
            operation: "connect",
            timeout: connect_timeout,
        })),
    }
}

// =============================================================================
// PollEngine
// =============================================================================

/// Reads every catalog batch and assembles one snapshot per cycle.
#[derive(Clone)]
pub struct PollEngine {
    bus: SharedBus,
    catalog: Arc<RegisterCatalog>,
    settings: PollSettings,
}

impl PollEngine {
    /// Creates a poll engine over a shared bus.
    pub fn new(bus: SharedBus, catalog: Arc<RegisterCatalog>, settings: PollSettings) -> Self {
        Self {
            bus,
            catalog,
            settings,
        }
    }

    /// Returns the catalog driving this engine.
    pub fn catalog(&self) -> &RegisterCatalog {
        &self.catalog
    }

    /// Executes one poll cycle.
    ///
    /// Holds the bus lock for the whole cycle. A connection failure aborts
    /// the cycle with [`EngineError::Connectivity`]; a failed batch only
    /// degrades its own keys to absence markers and the remaining batches
    /// are still read, maximizing partial data availability.
    pub async fn poll(&self) -> EngineResult<Snapshot> {
        let mut transport = self.bus.lock().await;

        ensure_connected(&mut **transport, self.settings.connect_timeout).await?;

        let mut builder = SnapshotBuilder::new();
        for batch in self.catalog.batches() {
            match self.read_batch(&mut **transport, batch).await {
                Ok(words) => {
                    for (offset, slot) in batch.slots.iter().enumerate() {
                        let word = *words.get(offset).ok_or_else(|| {
                            EngineError::Unexpected(format!(
                                "batch {} {}+{} answered {} words but slot {} was planned",
                                batch.bank,
                                batch.start,
                                batch.count,
                                words.len(),
                                offset
                            ))
                        })?;
                        for &idx in slot {
                            let spec = &self.catalog.specs()[idx];
                            builder.record(spec.key, spec.decode(word));
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        bank = %batch.bank,
                        start = batch.start,
                        count = batch.count,
                        error = %err,
                        "batch read exhausted its attempts; marking keys absent"
                    );
                    for spec in self.catalog.batch_specs(batch) {
                        builder.record_absent(spec.key, spec.absent());
                    }
                    if err.is_connection_loss() {
                        // Drop the dead handle now so the next cycle's
                        // ensure_connected performs the lazy reconnect.
                        let _ = transport.disconnect().await;
                    }
                }
            }
        }

        if self.settings.close_after_poll {
            let _ = transport.disconnect().await;
        }

        Ok(builder.finish())
    }

    async fn read_batch(
        &self,
        transport: &mut dyn SerialTransport,
        batch: &BatchSpec,
    ) -> EngineResult<Vec<u16>> {
        let mut attempt = 1;
        loop {
            let result = match batch.bank {
                Bank::Holding => {
                    transport
                        .read_holding_registers(batch.start, batch.count)
                        .await
                }
                Bank::Input => {
                    transport
                        .read_input_registers(batch.start, batch.count)
                        .await
                }
            };

            let err = match result {
                Ok(words) if words.len() >= batch.count as usize => return Ok(words),
                Ok(words) => EngineError::ShortResponse {
                    bank: batch.bank,
                    start: batch.start,
                    count: batch.count,
                    expected: batch.count as usize,
                    actual: words.len(),
                },
                Err(source) => EngineError::BatchRead {
                    bank: batch.bank,
                    start: batch.start,
                    count: batch.count,
                    source,
                },
            };

            if attempt >= self.settings.attempts || !err.is_retryable() {
                return Err(err);
            }

            tracing::debug!(
                bank = %batch.bank,
                start = batch.start,
                attempt,
                error = %err,
                "batch read failed, retrying"
            );
            tokio::time::sleep(self.settings.backoff).await;
            attempt += 1;
        }
    }
}

impl std::fmt::Debug for PollEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollEngine")
            .field("batches", &self.catalog.batches().len())
            .field("settings", &self.settings)
            .finish()
    }
}

// =============================================================================
// WriteGateway
// =============================================================================

/// Serializes single-register writes against the same bus as polling.
///
/// Writes are fail-fast: one attempt, bounded by the transport's request
/// timeout, no retry. The caller decides whether to re-issue, and is
/// responsible for requesting an out-of-band poll to observe the new state.
#[derive(Clone)]
pub struct WriteGateway {
    bus: SharedBus,
    connect_timeout: Duration,
}

impl WriteGateway {
    /// Creates a write gateway over a shared bus.
    pub fn new(bus: SharedBus, connect_timeout: Duration) -> Self {
        Self {
            bus,
            connect_timeout,
        }
    }

    /// Writes a single holding register.
    ///
    /// Queues behind any in-progress poll cycle; never interleaves with a
    /// batch read.
    pub async fn write(&self, address: u16, value: u16) -> EngineResult<()> {
        let mut transport = self.bus.lock().await;

        ensure_connected(&mut **transport, self.connect_timeout).await?;

        match transport.write_single_register(address, value).await {
            Ok(()) => {
                tracing::info!(address, value, "register written");
                Ok(())
            }
            Err(source) => {
                let err = EngineError::Write { address, source };
                if err.is_connection_loss() {
                    let _ = transport.disconnect().await;
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for WriteGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteGateway").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
