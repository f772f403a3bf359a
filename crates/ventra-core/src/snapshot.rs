// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Snapshots and the snapshot store.
//!
//! A [`Snapshot`] is one immutable set of decoded values, produced atomically
//! per poll cycle. The [`SnapshotStore`] publishes snapshots by reference:
//! consumers hold an `Arc` to the previous snapshot until they pick up the
//! next one, so a torn or half-written map is impossible by construction.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::watch;

use crate::catalog::Value;

// =============================================================================
// Snapshot
// =============================================================================

/// One atomic, immutable set of decoded register values.
///
/// Keys are the catalog's snapshot keys. A `None` value is the absence
/// marker for a numeric or enumerated key whose batch failed; boolean keys
/// degrade to `Some(Value::Bool(false))` instead, mirroring what consumers
/// of the switch surface expect.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    values: BTreeMap<&'static str, Option<Value>>,
    taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// Returns the decoded value for `key`, or `None` if the key is unknown
    /// or marked absent.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).copied().flatten()
    }

    /// Returns `true` if `key` exists in this snapshot (even if absent).
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Numeric accessor.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_number())
    }

    /// Boolean accessor. Absent boolean keys read as `Some(false)`.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Label accessor.
    pub fn label(&self, key: &str) -> Option<&'static str> {
        self.get(key).and_then(|v| v.as_label())
    }

    /// When this snapshot was captured.
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the snapshot holds no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<Value>)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Diagnostics view: only the `alarm_`-prefixed keys.
    pub fn alarms(&self) -> BTreeMap<&'static str, Option<Value>> {
        self.values
            .iter()
            .filter(|(k, _)| k.starts_with("alarm_"))
            .map(|(k, v)| (*k, *v))
            .collect()
    }

    /// Returns `true` if both snapshots decode to the same values,
    /// ignoring capture timestamps.
    pub fn same_values(&self, other: &Snapshot) -> bool {
        self.values == other.values
    }
}

// =============================================================================
// SnapshotBuilder
// =============================================================================

/// Accumulates decoded values during one poll cycle.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    values: BTreeMap<&'static str, Option<Value>>,
}

impl SnapshotBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a decoded value.
    pub fn record(&mut self, key: &'static str, value: Value) {
        self.values.insert(key, Some(value));
    }

    /// Records an absence marker (already shaped per decode kind).
    pub fn record_absent(&mut self, key: &'static str, marker: Option<Value>) {
        self.values.insert(key, marker);
    }

    /// Seals the builder into an immutable snapshot.
    pub fn finish(self) -> Snapshot {
        Snapshot {
            values: self.values,
            taken_at: Utc::now(),
        }
    }
}

// =============================================================================
// SnapshotStore
// =============================================================================

/// Holds the latest snapshot and notifies subscribers on replacement.
///
/// Cloning the store is cheap; all clones share state.
#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    latest: RwLock<Option<Arc<Snapshot>>>,
    tx: watch::Sender<Option<Arc<Snapshot>>>,
    fresh: AtomicBool,
    consecutive_failures: AtomicU32,
}

impl SnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(StoreInner {
                latest: RwLock::new(None),
                tx,
                fresh: AtomicBool::new(false),
                consecutive_failures: AtomicU32::new(0),
            }),
        }
    }

    /// Publishes a new snapshot, replacing the previous one atomically.
    pub fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        *self.inner.latest.write() = Some(snapshot.clone());
        self.inner.fresh.store(true, Ordering::SeqCst);
        self.inner.consecutive_failures.store(0, Ordering::SeqCst);
        let _ = self.inner.tx.send(Some(snapshot));
    }

    /// Marks the current data stale after a failed poll cycle. The last
    /// snapshot remains visible as the last-known-good value.
    pub fn mark_stale(&self) {
        self.inner.fresh.store(false, Ordering::SeqCst);
        self.inner
            .consecutive_failures
            .fetch_add(1, Ordering::SeqCst);
    }

    /// Returns the latest snapshot, if any poll has succeeded yet.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.inner.latest.read().clone()
    }

    /// Subscribes to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.tx.subscribe()
    }

    /// Returns `true` if the last poll cycle succeeded.
    pub fn is_fresh(&self) -> bool {
        self.inner.fresh.load(Ordering::SeqCst)
    }

    /// Number of poll cycles failed since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.inner.consecutive_failures.load(Ordering::SeqCst)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("has_snapshot", &self.latest().is_some())
            .field("fresh", &self.is_fresh())
            .field("consecutive_failures", &self.consecutive_failures())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut builder = SnapshotBuilder::new();
        builder.record("target_temp", Value::Number(21.5));
        builder.record("eco_modus", Value::Bool(true));
        builder.record("alarm_saf", Value::Label("Inactive"));
        builder.record_absent("temp_supply", None);
        builder.finish()
    }

    #[test]
    fn test_accessors() {
        let snapshot = sample();
        assert_eq!(snapshot.number("target_temp"), Some(21.5));
        assert_eq!(snapshot.flag("eco_modus"), Some(true));
        assert_eq!(snapshot.label("alarm_saf"), Some("Inactive"));
        assert_eq!(snapshot.get("temp_supply"), None);
        assert!(snapshot.contains_key("temp_supply"));
        assert!(!snapshot.contains_key("nonexistent"));
    }

    #[test]
    fn test_zero_is_not_absence() {
        let mut builder = SnapshotBuilder::new();
        builder.record("temp_outdoor", Value::Number(0.0));
        let snapshot = builder.finish();
        // A zero reading is a valid value, distinct from an absent key.
        assert_eq!(snapshot.number("temp_outdoor"), Some(0.0));
        assert!(snapshot.get("temp_outdoor").is_some());
    }

    #[test]
    fn test_alarm_filter() {
        let snapshot = sample();
        let alarms = snapshot.alarms();
        assert_eq!(alarms.len(), 1);
        assert!(alarms.contains_key("alarm_saf"));
    }

    #[test]
    fn test_same_values_ignores_timestamp() {
        let a = sample();
        let b = sample();
        assert!(a.same_values(&b));
    }

    #[test]
    fn test_store_publish_and_staleness() {
        let store = SnapshotStore::new();
        assert!(store.latest().is_none());
        assert!(!store.is_fresh());

        store.publish(sample());
        assert!(store.is_fresh());
        assert_eq!(store.consecutive_failures(), 0);
        let first = store.latest().unwrap();

        store.mark_stale();
        store.mark_stale();
        assert!(!store.is_fresh());
        assert_eq!(store.consecutive_failures(), 2);
        // Last-known-good snapshot survives staleness.
        assert!(Arc::ptr_eq(&first, &store.latest().unwrap()));

        store.publish(sample());
        assert!(store.is_fresh());
        assert_eq!(store.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn test_store_notifies_subscribers() {
        let store = SnapshotStore::new();
        let mut rx = store.subscribe();
        assert!(rx.borrow().is_none());

        store.publish(sample());
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());
    }
}
