// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Poll scheduling and the consumer-facing handle.
//!
//! The [`PollCoordinator`] drives the engine on a fixed interval and on
//! demand (after a successful write), publishing each snapshot through the
//! [`SnapshotStore`]. Consumers interact only with the cloneable
//! [`CoordinatorHandle`]; the transport and engine never leak out.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::catalog::Value;
use crate::engine::{PollEngine, WriteGateway};
use crate::error::EngineError;
use crate::snapshot::{Snapshot, SnapshotStore};

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

// =============================================================================
// PollCoordinator
// =============================================================================

/// Owns the poll loop for one device.
pub struct PollCoordinator {
    engine: PollEngine,
    store: SnapshotStore,
    interval: Duration,
    refresh_rx: mpsc::Receiver<()>,
}

impl PollCoordinator {
    /// Creates a coordinator and its consumer handle.
    pub fn new(
        engine: PollEngine,
        gateway: WriteGateway,
        interval: Duration,
    ) -> (Self, CoordinatorHandle) {
        let store = SnapshotStore::new();
        let (refresh_tx, refresh_rx) = mpsc::channel(4);

        let handle = CoordinatorHandle {
            store: store.clone(),
            refresh_tx,
            gateway,
        };

        let coordinator = Self {
            engine,
            store,
            interval,
            refresh_rx,
        };

        (coordinator, handle)
    }

    /// Executes one poll cycle and publishes the result.
    ///
    /// A connectivity failure marks the store stale and leaves the previous
    /// snapshot as the last-known-good value; it never tears the loop down.
    pub async fn poll_once(&self) {
        poll_cycle(&self.engine, &self.store).await;
    }

    /// Runs the poll loop until `shutdown` resolves.
    ///
    /// The first tick fires immediately, so consumers get an initial
    /// snapshot without waiting a full interval. Refresh requests queued by
    /// the handle trigger an extra out-of-band cycle.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        let Self {
            engine,
            store,
            interval,
            mut refresh_rx,
        } = self;

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        tracing::info!(interval = ?interval, "poll loop started");
        loop {
            tokio::select! {
                _ = ticker.tick() => poll_cycle(&engine, &store).await,
                Some(()) = refresh_rx.recv() => {
                    tracing::debug!("out-of-band refresh requested");
                    poll_cycle(&engine, &store).await;
                }
                () = &mut shutdown => break,
            }
        }
        tracing::info!("poll loop stopped");
    }
}

async fn poll_cycle(engine: &PollEngine, store: &SnapshotStore) {
    match engine.poll().await {
        Ok(snapshot) => {
            tracing::debug!(keys = snapshot.len(), "poll cycle complete");
            store.publish(snapshot);
        }
        Err(err @ EngineError::Connectivity(_)) => {
            tracing::warn!(error = %err, "poll cycle failed; keeping last snapshot");
            store.mark_stale();
        }
        Err(err) => {
            tracing::error!(error = %err, "unexpected poll failure");
            store.mark_stale();
        }
    }
}

impl std::fmt::Debug for PollCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollCoordinator")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CoordinatorHandle
// =============================================================================

/// Cloneable consumer surface over the poll loop.
///
/// This is the only object presentation adapters see: the latest snapshot,
/// a staleness signal, the write surface, and the refresh trigger.
#[derive(Clone)]
pub struct CoordinatorHandle {
    store: SnapshotStore,
    refresh_tx: mpsc::Sender<()>,
    gateway: WriteGateway,
}

impl CoordinatorHandle {
    /// Returns the latest snapshot, if any poll has succeeded yet.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.store.latest()
    }

    /// Subscribes to snapshot replacements.
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<Option<Arc<Snapshot>>> {
        self.store.subscribe()
    }

    /// Returns `true` if the last poll cycle succeeded.
    pub fn is_fresh(&self) -> bool {
        self.store.is_fresh()
    }

    /// Number of consecutive failed poll cycles.
    pub fn consecutive_failures(&self) -> u32 {
        self.store.consecutive_failures()
    }

    /// Requests an out-of-band poll cycle. Non-blocking; coalesces when a
    /// refresh is already queued.
    pub fn request_refresh(&self) {
        if let Err(e) = self.refresh_tx.try_send(()) {
            match e {
                mpsc::error::TrySendError::Full(_) => {
                    tracing::debug!("refresh already queued");
                }
                mpsc::error::TrySendError::Closed(_) => {
                    tracing::warn!("refresh requested after poll loop stopped");
                }
            }
        }
    }

    /// Writes a single register, reporting plain success or failure.
    ///
    /// The typed error is logged here; callers at the presentation surface
    /// only branch on the boolean. A successful write does NOT refresh the
    /// snapshot by itself; pair it with [`Self::request_refresh`].
    pub async fn request_write(&self, address: u16, value: u16) -> bool {
        match self.gateway.write(address, value).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(address, value, error = %err, "write request failed");
                false
            }
        }
    }

    /// Diagnostics export: the alarm keys of the latest snapshot.
    pub fn alarms(&self) -> Option<BTreeMap<&'static str, Option<Value>>> {
        self.latest().map(|s| s.alarms())
    }
}

impl std::fmt::Debug for CoordinatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorHandle")
            .field("fresh", &self.is_fresh())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
