// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Climate view and commands.
//!
//! Reads come from the snapshot's `temp_supply`, `target_temp`, `mode_main`,
//! and `mode_speed` keys; commands write the user mode, fan speed, and
//! setpoint registers and then request an out-of-band refresh so the next
//! snapshot reflects the change.

use serde::Serialize;
use ventra_core::registers::{REG_FAN_SPEED, REG_TARGET_TEMP, REG_USER_MODE};
use ventra_core::{CoordinatorHandle, Snapshot, Value};

// =============================================================================
// State types
// =============================================================================

/// High-level operating mode derived from the user mode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    /// Unit parked (holiday mode).
    Off,
    /// Demand-controlled ventilation.
    Auto,
    /// Manual fan-only operation.
    FanOnly,
}

/// Fan speed derived from the fan speed register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FanMode {
    /// Low speed.
    Low,
    /// Medium speed.
    Medium,
    /// High speed.
    High,
}

impl FanMode {
    fn command_value(self) -> u16 {
        match self {
            Self::Low => 2,
            Self::Medium => 3,
            Self::High => 4,
        }
    }
}

/// Temporary user mode presets offered by the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetMode {
    /// Crowded: boost for many occupants.
    Crowded,
    /// Refresh: short high-flow purge.
    Refresh,
    /// Fireplace: supply overpressure.
    Fireplace,
    /// Away: reduced flow.
    Away,
    /// Holiday: minimum flow, long absence.
    Holiday,
    /// Kitchen hood assist.
    Kitchen,
    /// Vacuum cleaner assist.
    VacuumCleaner,
}

impl PresetMode {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Crowded" => Some(Self::Crowded),
            "Refresh" => Some(Self::Refresh),
            "Fireplace" => Some(Self::Fireplace),
            "Away" => Some(Self::Away),
            "Holiday" => Some(Self::Holiday),
            "Kitchen" => Some(Self::Kitchen),
            "Vacuum Cleaner" => Some(Self::VacuumCleaner),
            _ => None,
        }
    }

    fn command_value(self) -> u16 {
        match self {
            Self::Crowded => 2,
            Self::Refresh => 3,
            Self::Fireplace => 4,
            Self::Away => 5,
            Self::Holiday => 6,
            Self::Kitchen => 7,
            Self::VacuumCleaner => 8,
        }
    }
}

/// Decoded climate state for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateState {
    /// Supply air temperature.
    pub current_temperature: Option<f64>,
    /// Setpoint temperature.
    pub target_temperature: Option<f64>,
    /// Operating mode.
    pub hvac_mode: HvacMode,
    /// Fan speed.
    pub fan_mode: FanMode,
    /// Active preset, if the unit is in one.
    pub preset_mode: Option<PresetMode>,
}

impl ClimateState {
    /// Derives the climate state from a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let hvac_mode = match snapshot.get("mode_main") {
            Some(Value::Label("Auto")) => HvacMode::Auto,
            Some(Value::Label("Manual")) => HvacMode::FanOnly,
            // Holiday parks the unit; unknown or absent reads as off.
            _ => HvacMode::Off,
        };

        let fan_mode = match snapshot.get("mode_speed") {
            Some(Value::Label("Medium")) => FanMode::Medium,
            Some(Value::Label("High")) => FanMode::High,
            _ => FanMode::Low,
        };

        let preset_mode = snapshot
            .label("mode_main")
            .and_then(PresetMode::from_label);

        Self {
            current_temperature: snapshot.number("temp_supply"),
            target_temperature: snapshot.number("target_temp"),
            hvac_mode,
            fan_mode,
            preset_mode,
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Write surface for climate control.
#[derive(Debug, Clone)]
pub struct ClimateCommands {
    handle: CoordinatorHandle,
}

impl ClimateCommands {
    /// Creates climate commands over a coordinator handle.
    pub fn new(handle: CoordinatorHandle) -> Self {
        Self { handle }
    }

    async fn write_and_refresh(&self, address: u16, value: u16) -> bool {
        let ok = self.handle.request_write(address, value).await;
        if ok {
            self.handle.request_refresh();
        }
        ok
    }

    /// Sets the operating mode.
    pub async fn set_hvac_mode(&self, mode: HvacMode) -> bool {
        let value = match mode {
            HvacMode::Off => 7,
            HvacMode::Auto => 1,
            HvacMode::FanOnly => 2,
        };
        self.write_and_refresh(REG_USER_MODE, value).await
    }

    /// Sets the fan speed.
    pub async fn set_fan_mode(&self, mode: FanMode) -> bool {
        self.write_and_refresh(REG_FAN_SPEED, mode.command_value())
            .await
    }

    /// Activates a preset user mode.
    pub async fn set_preset_mode(&self, preset: PresetMode) -> bool {
        self.write_and_refresh(REG_USER_MODE, preset.command_value())
            .await
    }

    /// Sets the target temperature. The register encodes tenths of a degree;
    /// out-of-range setpoints are rejected without touching the bus.
    pub async fn set_target_temperature(&self, celsius: f64) -> bool {
        if !(0.0..=50.0).contains(&celsius) {
            tracing::warn!(celsius, "setpoint outside 0-50 range rejected");
            return false;
        }
        let value = (celsius * 10.0).round() as u16;
        self.write_and_refresh(REG_TARGET_TEMP, value).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ventra_core::SnapshotBuilder;

    fn snapshot_with_mode(mode: Value, speed: Value) -> Snapshot {
        let mut builder = SnapshotBuilder::new();
        builder.record("temp_supply", Value::Number(21.8));
        builder.record("target_temp", Value::Number(21.0));
        builder.record("mode_main", mode);
        builder.record("mode_speed", speed);
        builder.finish()
    }

    #[test]
    fn test_auto_mode() {
        let state = ClimateState::from_snapshot(&snapshot_with_mode(
            Value::Label("Auto"),
            Value::Label("Low"),
        ));
        assert_eq!(state.hvac_mode, HvacMode::Auto);
        assert_eq!(state.fan_mode, FanMode::Low);
        assert_eq!(state.preset_mode, None);
        assert_eq!(state.current_temperature, Some(21.8));
        assert_eq!(state.target_temperature, Some(21.0));
    }

    #[test]
    fn test_holiday_reads_as_off_with_preset() {
        let state = ClimateState::from_snapshot(&snapshot_with_mode(
            Value::Label("Holiday"),
            Value::Label("Medium"),
        ));
        assert_eq!(state.hvac_mode, HvacMode::Off);
        assert_eq!(state.preset_mode, Some(PresetMode::Holiday));
        assert_eq!(state.fan_mode, FanMode::Medium);
    }

    #[test]
    fn test_unknown_mode_defaults_to_off_low() {
        // An undocumented firmware code decodes to the raw integer.
        let state =
            ClimateState::from_snapshot(&snapshot_with_mode(Value::Number(42.0), Value::Number(9.0)));
        assert_eq!(state.hvac_mode, HvacMode::Off);
        assert_eq!(state.fan_mode, FanMode::Low);
        assert_eq!(state.preset_mode, None);
    }

    #[test]
    fn test_absent_keys() {
        let snapshot = SnapshotBuilder::new().finish();
        let state = ClimateState::from_snapshot(&snapshot);
        assert_eq!(state.current_temperature, None);
        assert_eq!(state.target_temperature, None);
        assert_eq!(state.hvac_mode, HvacMode::Off);
    }

    #[test]
    fn test_fan_command_values() {
        assert_eq!(FanMode::Low.command_value(), 2);
        assert_eq!(FanMode::Medium.command_value(), 3);
        assert_eq!(FanMode::High.command_value(), 4);
    }

    #[test]
    fn test_preset_command_values() {
        assert_eq!(PresetMode::Crowded.command_value(), 2);
        assert_eq!(PresetMode::VacuumCleaner.command_value(), 8);
        assert_eq!(PresetMode::from_label("Fireplace"), Some(PresetMode::Fireplace));
        assert_eq!(PresetMode::from_label("Auto"), None);
    }
}
