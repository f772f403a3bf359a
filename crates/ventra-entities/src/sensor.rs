// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Sensor definitions.
//!
//! A static table maps snapshot keys to display names and engineering units.
//! Diagnostic-category sensors (pressures, fan internals, filter data) are
//! flagged so front-ends can tuck them away by default.

use serde::Serialize;
use ventra_core::{Snapshot, Value};

// =============================================================================
// Units & categories
// =============================================================================

/// Engineering unit of a sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Degrees Celsius.
    Celsius,
    /// Relative percentage.
    Percent,
    /// Revolutions per minute.
    Rpm,
    /// Pascal.
    Pascal,
    /// Months.
    Months,
    /// Seconds.
    Seconds,
    /// Parts per million.
    Ppm,
    /// Unitless state or count.
    None,
}

/// Where a sensor belongs in a front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorCategory {
    /// Day-to-day operational reading.
    Operational,
    /// Service and troubleshooting reading.
    Diagnostic,
}

// =============================================================================
// SensorDef
// =============================================================================

/// One sensor: a snapshot key plus presentation metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorDef {
    /// Snapshot key this sensor reads.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Engineering unit.
    pub unit: Unit,
    /// Front-end category.
    pub category: SensorCategory,
}

impl SensorDef {
    const fn operational(key: &'static str, name: &'static str, unit: Unit) -> Self {
        Self {
            key,
            name,
            unit,
            category: SensorCategory::Operational,
        }
    }

    const fn diagnostic(key: &'static str, name: &'static str, unit: Unit) -> Self {
        Self {
            key,
            name,
            unit,
            category: SensorCategory::Diagnostic,
        }
    }

    /// Resolves this sensor's reading against a snapshot. `None` means the
    /// key was absent (its batch failed) or never polled.
    pub fn read(&self, snapshot: &Snapshot) -> Option<Value> {
        snapshot.get(self.key)
    }
}

/// The sensor table.
pub const SENSORS: &[SensorDef] = &[
    // Modes
    SensorDef::operational("mode_main", "Mode Main", Unit::None),
    SensorDef::operational("mode_speed", "Mode Speed", Unit::None),
    // Temperatures
    SensorDef::operational("temp_outdoor", "Temp Outdoor", Unit::Celsius),
    SensorDef::operational("temp_supply", "Temp Supply", Unit::Celsius),
    SensorDef::operational("temp_extract", "Temp Extract", Unit::Celsius),
    SensorDef::operational("temp_exhaust", "Temp Exhaust", Unit::Celsius),
    SensorDef::operational("temp_overheat", "Temp Overheat", Unit::Celsius),
    // Humidity
    SensorDef::operational("humidity", "Humidity", Unit::Percent),
    SensorDef::operational("exhaust_humidity", "Exhaust Humidity", Unit::Percent),
    SensorDef::operational("intake_humidity", "Intake Humidity", Unit::Percent),
    SensorDef::diagnostic("humidity_exhaust", "Humidity Setpoint Exhaust", Unit::Percent),
    SensorDef::diagnostic("humidity_intake", "Humidity Setpoint Intake", Unit::Percent),
    SensorDef::diagnostic("setpoint_rh_transfer", "RH Transfer Setpoint", Unit::Percent),
    SensorDef::diagnostic("humidity_return_value", "Humidity Return Value", Unit::Percent),
    // Fans
    SensorDef::operational("saf_rpm", "Supply Fan RPM", Unit::Rpm),
    SensorDef::operational("eaf_rpm", "Extract Fan RPM", Unit::Rpm),
    SensorDef::diagnostic("fan_supply", "Fan Supply Output", Unit::Percent),
    SensorDef::diagnostic("fan_extract", "Fan Extract Output", Unit::Percent),
    SensorDef::diagnostic("supply_fan_speed", "Supply Fan Speed", Unit::Percent),
    SensorDef::diagnostic("extract_fan_speed", "Extract Fan Speed", Unit::Percent),
    SensorDef::diagnostic("sensor_flow_piggyback_saf", "Flow Piggyback SAF", Unit::None),
    SensorDef::diagnostic("sensor_flow_piggyback_eaf", "Flow Piggyback EAF", Unit::None),
    // Pressures
    SensorDef::diagnostic("supply_air_pressure", "Supply Air Pressure", Unit::Pascal),
    SensorDef::diagnostic("extract_air_pressure", "Extract Air Pressure", Unit::Pascal),
    SensorDef::diagnostic("filter_pressure", "Filter Pressure", Unit::Pascal),
    // Heat recovery & heater
    SensorDef::operational("heat_exchanger_state", "Heat Exchanger State", Unit::Percent),
    SensorDef::operational("heater_percentage", "Heater Output", Unit::Percent),
    SensorDef::diagnostic("heater", "Heater Signal", Unit::Percent),
    SensorDef::diagnostic("rotor", "Rotor Output", Unit::Percent),
    SensorDef::diagnostic("rotor_rotation_speed", "Rotor Rotation Speed", Unit::Percent),
    SensorDef::diagnostic("heat_recovery_efficiency", "Heat Recovery Efficiency", Unit::Percent),
    SensorDef::diagnostic("cooling_recovery_temp", "Cooling Recovery Temp", Unit::Celsius),
    // Filter
    SensorDef::diagnostic("filter_replace_month", "Filter Replace Interval", Unit::Months),
    SensorDef::diagnostic("filter_replace_seconds", "Filter Replace Timer", Unit::Seconds),
    SensorDef::diagnostic("remaining_filter_time", "Remaining Filter Time", Unit::Seconds),
    // Misc
    SensorDef::operational("co2_level", "CO2 Level", Unit::Ppm),
    SensorDef::diagnostic("sfp_supply", "SFP Supply", Unit::None),
    SensorDef::diagnostic("energy_consumption", "Energy Consumption", Unit::None),
    SensorDef::diagnostic("usermode_remain_time", "User Mode Remaining Time", Unit::Seconds),
    SensorDef::diagnostic("setpoint_eco_offset", "ECO Offset", Unit::Celsius),
    SensorDef::diagnostic("defrost_level", "Defrost Level", Unit::None),
    SensorDef::diagnostic("test_mode_reg", "Test Mode Register", Unit::None),
];

/// Looks up a sensor definition by key.
pub fn sensor(key: &str) -> Option<&'static SensorDef> {
    SENSORS.iter().find(|s| s.key == key)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ventra_core::{vsr_catalog, SnapshotBuilder};

    #[test]
    fn test_every_sensor_key_exists_in_catalog() {
        let catalog = vsr_catalog();
        for def in SENSORS {
            assert!(
                catalog.spec(def.key).is_some(),
                "sensor {} reads unknown key {}",
                def.name,
                def.key
            );
        }
    }

    #[test]
    fn test_no_duplicate_sensor_keys() {
        let mut seen = std::collections::HashSet::new();
        for def in SENSORS {
            assert!(seen.insert(def.key), "duplicate sensor key {}", def.key);
        }
    }

    #[test]
    fn test_read_resolves_value_and_absence() {
        let mut builder = SnapshotBuilder::new();
        builder.record("temp_outdoor", Value::Number(-3.5));
        builder.record_absent("saf_rpm", None);
        let snapshot = builder.finish();

        let outdoor = sensor("temp_outdoor").unwrap();
        assert_eq!(outdoor.read(&snapshot), Some(Value::Number(-3.5)));
        assert_eq!(outdoor.unit, Unit::Celsius);

        let rpm = sensor("saf_rpm").unwrap();
        assert_eq!(rpm.read(&snapshot), None);
    }

    #[test]
    fn test_lookup_unknown_key() {
        assert!(sensor("nonexistent").is_none());
    }
}
