// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Mock serial transport for testing the engine in isolation.
//!
//! Design principles:
//!
//! - Scriptable register values and error injection per range
//! - A journal of enter/exit events per bus operation, so tests can prove
//!   the mutual-exclusion invariant (no two operations ever overlap)
//! - Thread-safe: the transport moves into the bus, tests keep a
//!   [`MockHandle`] to the shared state

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use ventra_modbus::{SerialTransport, TransportError, TransportResult, TransportState};

/// One journal event: `+op` on entry, `-op` on exit.
pub type JournalEvent = String;

#[derive(Default)]
struct MockState {
    holding: Mutex<HashMap<u16, u16>>,
    input: Mutex<HashMap<u16, u16>>,
    journal: Mutex<Vec<JournalEvent>>,

    /// Ranges (by start address) that always fail.
    fail_ranges: Mutex<HashSet<u16>>,
    /// Ranges that fail for the next N attempts, then recover.
    fail_counts: Mutex<HashMap<u16, u32>>,
    /// Ranges answering one word short of the request.
    short_ranges: Mutex<HashSet<u16>>,

    fail_connect: AtomicBool,
    fail_all_writes: AtomicBool,

    connect_count: AtomicU64,
    read_count: AtomicU64,
    write_count: AtomicU64,
}

/// Scriptable mock implementing [`SerialTransport`].
pub struct MockTransport {
    state: Arc<MockState>,
    connected: bool,
    /// Simulated per-operation latency.
    latency: Duration,
}

/// Shared view of the mock's state, kept by the test after the transport
/// moves into the bus.
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<MockState>,
}

impl MockTransport {
    /// Creates a mock with zero latency.
    pub fn new() -> (Self, MockHandle) {
        Self::with_latency(Duration::ZERO)
    }

    /// Creates a mock whose every bus operation takes `latency`.
    pub fn with_latency(latency: Duration) -> (Self, MockHandle) {
        let state = Arc::new(MockState::default());
        (
            Self {
                state: state.clone(),
                connected: false,
                latency,
            },
            MockHandle { state },
        )
    }

    async fn trace<T>(
        &self,
        op: String,
        result: TransportResult<T>,
    ) -> TransportResult<T> {
        self.state.journal.lock().push(format!("+{op}"));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.state.journal.lock().push(format!("-{op}"));
        result
    }

    fn range_failure(&self, start: u16) -> Option<TransportError> {
        if self.state.fail_ranges.lock().contains(&start) {
            return Some(TransportError::Io {
                operation: "read",
                source: std::io::Error::other("scripted range failure"),
            });
        }
        let mut counts = self.state.fail_counts.lock();
        if let Some(remaining) = counts.get_mut(&start) {
            if *remaining > 0 {
                *remaining -= 1;
                return Some(TransportError::Timeout {
                    operation: "read",
                    timeout: Duration::from_secs(3),
                });
            }
        }
        None
    }

    fn read_range(map: &HashMap<u16, u16>, start: u16, count: u16) -> Vec<u16> {
        (0..count)
            .map(|i| map.get(&(start + i)).copied().unwrap_or(0))
            .collect()
    }
}

#[async_trait]
impl SerialTransport for MockTransport {
    async fn connect(&mut self) -> TransportResult<()> {
        self.state.connect_count.fetch_add(1, Ordering::SeqCst);
        let result = if self.state.fail_connect.load(Ordering::SeqCst) {
            Err(TransportError::PortNotFound {
                port: "/dev/ttyMOCK".into(),
            })
        } else {
            self.connected = true;
            Ok(())
        };
        self.trace("connect".to_string(), result).await
    }

    async fn disconnect(&mut self) -> TransportResult<()> {
        self.connected = false;
        self.trace("disconnect".to_string(), Ok(())).await
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn state(&self) -> TransportState {
        if self.connected {
            TransportState::Connected
        } else {
            TransportState::Disconnected
        }
    }

    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> TransportResult<Vec<u16>> {
        self.state.read_count.fetch_add(1, Ordering::SeqCst);
        let result = if !self.connected {
            Err(TransportError::NotConnected)
        } else {
            match self.range_failure(address) {
                Some(err) => Err(err),
                None if self.state.short_ranges.lock().contains(&address) => Ok(
                    Self::read_range(&self.state.holding.lock(), address, count.saturating_sub(1)),
                ),
                None => Ok(Self::read_range(&self.state.holding.lock(), address, count)),
            }
        };
        self.trace(format!("read_holding:{address}+{count}"), result).await
    }

    async fn read_input_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> TransportResult<Vec<u16>> {
        self.state.read_count.fetch_add(1, Ordering::SeqCst);
        let result = if !self.connected {
            Err(TransportError::NotConnected)
        } else {
            match self.range_failure(address) {
                Some(err) => Err(err),
                None if self.state.short_ranges.lock().contains(&address) => Ok(
                    Self::read_range(&self.state.input.lock(), address, count.saturating_sub(1)),
                ),
                None => Ok(Self::read_range(&self.state.input.lock(), address, count)),
            }
        };
        self.trace(format!("read_input:{address}+{count}"), result).await
    }

    async fn write_single_register(&mut self, address: u16, value: u16) -> TransportResult<()> {
        self.state.write_count.fetch_add(1, Ordering::SeqCst);
        let result = if self.state.fail_all_writes.load(Ordering::SeqCst) {
            Err(TransportError::Timeout {
                operation: "write_single_register",
                timeout: Duration::from_secs(3),
            })
        } else {
            self.state.holding.lock().insert(address, value);
            Ok(())
        };
        self.trace(format!("write:{address}={value}"), result).await
    }

    fn unit_id(&self) -> u8 {
        1
    }

    fn display_name(&self) -> String {
        "mock transport".to_string()
    }
}

impl MockHandle {
    /// Sets a holding register value.
    pub fn set_holding(&self, address: u16, value: u16) {
        self.state.holding.lock().insert(address, value);
    }

    /// Sets an input register value.
    pub fn set_input(&self, address: u16, value: u16) {
        self.state.input.lock().insert(address, value);
    }

    /// Reads back a holding register (to verify writes).
    pub fn holding(&self, address: u16) -> Option<u16> {
        self.state.holding.lock().get(&address).copied()
    }

    /// Makes every read of the range starting at `start` fail.
    pub fn fail_range(&self, start: u16) {
        self.state.fail_ranges.lock().insert(start);
    }

    /// Clears a scripted range failure.
    pub fn heal_range(&self, start: u16) {
        self.state.fail_ranges.lock().remove(&start);
    }

    /// Makes the next `attempts` reads of the range fail, then recover.
    pub fn fail_range_times(&self, start: u16, attempts: u32) {
        self.state.fail_counts.lock().insert(start, attempts);
    }

    /// Makes the range answer one word short.
    pub fn short_range(&self, start: u16) {
        self.state.short_ranges.lock().insert(start);
    }

    /// Makes connection attempts fail.
    pub fn fail_connect(&self, fail: bool) {
        self.state.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Makes every write fail.
    pub fn fail_all_writes(&self, fail: bool) {
        self.state.fail_all_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of connect attempts.
    pub fn connect_count(&self) -> u64 {
        self.state.connect_count.load(Ordering::SeqCst)
    }

    /// Number of range reads issued.
    pub fn read_count(&self) -> u64 {
        self.state.read_count.load(Ordering::SeqCst)
    }

    /// Number of writes issued.
    pub fn write_count(&self) -> u64 {
        self.state.write_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the operation journal.
    pub fn journal(&self) -> Vec<JournalEvent> {
        self.state.journal.lock().clone()
    }

    /// Asserts that no two bus operations ever overlapped: every `+op`
    /// entry must be immediately followed (in nesting terms) by its `-op`
    /// before another operation begins.
    pub fn assert_no_interleaving(&self) {
        let journal = self.journal();
        let mut open: Option<&str> = None;
        for event in &journal {
            let (kind, op) = event.split_at(1);
            match kind {
                "+" => {
                    assert!(
                        open.is_none(),
                        "operation {op:?} began while {:?} was in flight; journal: {journal:?}",
                        open.unwrap()
                    );
                    open = Some(op);
                }
                "-" => {
                    assert_eq!(
                        open,
                        Some(op),
                        "operation {op:?} ended out of order; journal: {journal:?}"
                    );
                    open = None;
                }
                _ => panic!("malformed journal event {event:?}"),
            }
        }
        assert!(open.is_none(), "operation {:?} never ended", open.unwrap());
    }
}
