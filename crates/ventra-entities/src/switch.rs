// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Feature switches.
//!
//! Each switch writes a command register and verifies its state through a
//! snapshot key. For the RH transfer switch the verify key reads a different
//! register than the command targets; the other two verify on the register
//! they write.

use serde::Serialize;
use ventra_core::registers::{REG_ECO_MODE, REG_HEATER_ENABLE, REG_RH_TRANSFER};
use ventra_core::{CoordinatorHandle, Snapshot};

// =============================================================================
// SwitchDef
// =============================================================================

/// One boolean feature switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwitchDef {
    /// Display name.
    pub name: &'static str,
    /// Register written by on/off commands.
    pub command_address: u16,
    /// Value written to switch on.
    pub on_value: u16,
    /// Value written to switch off.
    pub off_value: u16,
    /// Snapshot key the current state is read from.
    pub verify_key: &'static str,
}

/// The switch table.
pub const SWITCHES: &[SwitchDef] = &[
    SwitchDef {
        name: "ECO Mode",
        command_address: REG_ECO_MODE,
        on_value: 1,
        off_value: 0,
        verify_key: "eco_modus",
    },
    SwitchDef {
        name: "Heater",
        command_address: REG_HEATER_ENABLE,
        on_value: 1,
        off_value: 0,
        verify_key: "heater_switch",
    },
    SwitchDef {
        name: "RH Transfer",
        command_address: REG_RH_TRANSFER,
        on_value: 1,
        off_value: 0,
        verify_key: "rh_switch",
    },
];

impl SwitchDef {
    /// Reads the switch state from a snapshot. Absent state reads as `false`
    /// by the boolean degradation rule, and `None` only if the key was never
    /// polled at all.
    pub fn is_on(&self, snapshot: &Snapshot) -> Option<bool> {
        if !snapshot.contains_key(self.verify_key) {
            return None;
        }
        Some(snapshot.get(self.verify_key).is_some_and(|v| v.is_truthy()))
    }

    /// Switches on, then requests a refresh so the state is observed.
    pub async fn turn_on(&self, handle: &CoordinatorHandle) -> bool {
        self.command(handle, self.on_value).await
    }

    /// Switches off, then requests a refresh so the state is observed.
    pub async fn turn_off(&self, handle: &CoordinatorHandle) -> bool {
        self.command(handle, self.off_value).await
    }

    async fn command(&self, handle: &CoordinatorHandle, value: u16) -> bool {
        let ok = handle.request_write(self.command_address, value).await;
        if ok {
            handle.request_refresh();
        } else {
            tracing::warn!(switch = self.name, value, "switch command failed");
        }
        ok
    }
}

/// Looks up a switch by its verify key.
pub fn switch(verify_key: &str) -> Option<&'static SwitchDef> {
    SWITCHES.iter().find(|s| s.verify_key == verify_key)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ventra_core::{vsr_catalog, SnapshotBuilder, Value};

    #[test]
    fn test_verify_keys_exist_and_are_boolean() {
        let catalog = vsr_catalog();
        for def in SWITCHES {
            let spec = catalog
                .spec(def.verify_key)
                .unwrap_or_else(|| panic!("switch {} verifies unknown key", def.name));
            assert!(spec.decode.is_bool(), "switch {} must verify a flag", def.name);
        }
    }

    #[test]
    fn test_is_on_states() {
        let mut builder = SnapshotBuilder::new();
        builder.record("eco_modus", Value::Bool(true));
        builder.record("heater_switch", Value::Bool(false));
        let snapshot = builder.finish();

        assert_eq!(switch("eco_modus").unwrap().is_on(&snapshot), Some(true));
        assert_eq!(switch("heater_switch").unwrap().is_on(&snapshot), Some(false));
        // Never polled at all.
        assert_eq!(switch("rh_switch").unwrap().is_on(&snapshot), None);
    }

    #[test]
    fn test_rh_switch_commands_different_register_than_it_verifies() {
        let catalog = vsr_catalog();
        let def = switch("rh_switch").unwrap();
        let verify_spec = catalog.spec(def.verify_key).unwrap();
        assert_ne!(def.command_address, verify_spec.address);
    }
}
