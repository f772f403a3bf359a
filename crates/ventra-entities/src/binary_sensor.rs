// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Operational on/off indicators.
//!
//! These read numeric snapshot keys and coerce them to booleans (non-zero is
//! on). Alarms deliberately do not appear here; they live in the
//! diagnostics export.

use serde::Serialize;
use ventra_core::Snapshot;

/// Semantic class of a binary indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryClass {
    /// Something opened (damper).
    Opening,
    /// Cooling-related state.
    Cold,
    /// Heating-related state.
    Heat,
    /// Moisture-related state.
    Moisture,
    /// Motor running.
    Running,
}

/// One binary indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BinarySensorDef {
    /// Snapshot key this indicator reads.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Semantic class.
    pub class: BinaryClass,
}

/// The binary indicator table.
pub const BINARY_SENSORS: &[BinarySensorDef] = &[
    BinarySensorDef {
        key: "damper_state",
        name: "Damper State",
        class: BinaryClass::Opening,
    },
    BinarySensorDef {
        key: "cooldown",
        name: "Cooldown",
        class: BinaryClass::Cold,
    },
    BinarySensorDef {
        key: "humidity_return",
        name: "Humidity Return",
        class: BinaryClass::Moisture,
    },
    BinarySensorDef {
        key: "humidity_transfer_enabled",
        name: "Humidity Transfer Enabled",
        class: BinaryClass::Moisture,
    },
    BinarySensorDef {
        key: "mode_summerwinter",
        name: "Mode Summer Winter",
        class: BinaryClass::Heat,
    },
    BinarySensorDef {
        key: "fan_running",
        name: "Fan Running",
        class: BinaryClass::Running,
    },
    BinarySensorDef {
        key: "cooling_recovery",
        name: "Cooling Recovery",
        class: BinaryClass::Cold,
    },
];

impl BinarySensorDef {
    /// Reads the indicator from a snapshot; `None` when the key is absent.
    pub fn is_on(&self, snapshot: &Snapshot) -> Option<bool> {
        snapshot.get(self.key).map(|v| v.is_truthy())
    }
}

/// Looks up a binary indicator by key.
pub fn binary_sensor(key: &str) -> Option<&'static BinarySensorDef> {
    BINARY_SENSORS.iter().find(|s| s.key == key)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ventra_core::{vsr_catalog, SnapshotBuilder, Value};

    #[test]
    fn test_keys_exist_in_catalog() {
        let catalog = vsr_catalog();
        for def in BINARY_SENSORS {
            assert!(catalog.spec(def.key).is_some(), "unknown key {}", def.key);
        }
    }

    #[test]
    fn test_numeric_coercion() {
        let mut builder = SnapshotBuilder::new();
        builder.record("fan_running", Value::Number(1.0));
        builder.record("cooldown", Value::Number(0.0));
        builder.record_absent("damper_state", None);
        let snapshot = builder.finish();

        assert_eq!(binary_sensor("fan_running").unwrap().is_on(&snapshot), Some(true));
        assert_eq!(binary_sensor("cooldown").unwrap().is_on(&snapshot), Some(false));
        assert_eq!(binary_sensor("damper_state").unwrap().is_on(&snapshot), None);
    }
}
