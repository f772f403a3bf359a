// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The SAVE VSR register map.
//!
//! Single source of truth for every register the adapter touches. Earlier
//! firmware notes floated several divergent copies of this table; anything
//! added here is checked by [`RegisterCatalog::new`] at startup, so a bad
//! entry fails loudly instead of silently reading the wrong word.
//!
//! Bank policy: user mode (1160), fan speed mode (1130), and supply air
//! temperature (12102) live in the input bank; everything else is read from
//! holding registers. Writes always target holding registers.

use crate::catalog::{Bank, RegisterCatalog, RegisterSpec};

// =============================================================================
// Writable register addresses
// =============================================================================

/// Target temperature setpoint, written in 0.1 degree steps.
pub const REG_TARGET_TEMP: u16 = 2000;

/// User mode command register (off / auto / manual / presets).
pub const REG_USER_MODE: u16 = 1161;

/// Fan speed command register.
pub const REG_FAN_SPEED: u16 = 1130;

/// ECO mode enable.
pub const REG_ECO_MODE: u16 = 2504;

/// Heater enable.
pub const REG_HEATER_ENABLE: u16 = 3001;

/// Humidity transfer enable.
pub const REG_RH_TRANSFER: u16 = 2203;

// =============================================================================
// Enum label tables
// =============================================================================

/// User mode labels (register 1160).
pub const MODE_MAIN_LABELS: &[(u16, &str)] = &[
    (0, "Auto"),
    (1, "Manual"),
    (2, "Crowded"),
    (3, "Refresh"),
    (4, "Fireplace"),
    (5, "Away"),
    (6, "Holiday"),
    (7, "Kitchen"),
    (8, "Vacuum Cleaner"),
];

/// Fan speed labels (register 1130). Code 1 is reserved by the firmware and
/// intentionally absent, so it surfaces as the raw integer.
pub const MODE_SPEED_LABELS: &[(u16, &str)] = &[
    (0, "Off"),
    (2, "Low"),
    (3, "Medium"),
    (4, "High"),
];

/// Alarm state labels shared by every `alarm_*` register.
pub const ALARM_STATE_LABELS: &[(u16, &str)] = &[
    (0, "Inactive"),
    (1, "Active"),
    (2, "Waiting"),
    (3, "Cleared Error Active"),
];

// =============================================================================
// Register table
// =============================================================================

const fn alarm(key: &'static str, address: u16) -> RegisterSpec {
    RegisterSpec::labelled(key, address, Bank::Holding, ALARM_STATE_LABELS)
}

/// Every register of interest, one entry per snapshot key.
fn specs() -> Vec<RegisterSpec> {
    use Bank::{Holding, Input};

    vec![
        // Climate
        RegisterSpec::numeric("temp_supply", 12102, Input, 0.1),
        RegisterSpec::numeric("target_temp", REG_TARGET_TEMP, Holding, 0.1),
        RegisterSpec::labelled("mode_main", 1160, Input, MODE_MAIN_LABELS),
        RegisterSpec::labelled("mode_speed", 1130, Input, MODE_SPEED_LABELS),
        // Operational flags
        RegisterSpec::raw("damper_state", 14003, Holding),
        RegisterSpec::raw("cooldown", 1351, Holding),
        RegisterSpec::raw("humidity_return", 2146, Holding),
        RegisterSpec::raw("humidity_transfer_enabled", REG_RH_TRANSFER, Holding),
        RegisterSpec::raw("mode_summerwinter", 1038, Holding),
        RegisterSpec::raw("fan_running", 1350, Holding),
        RegisterSpec::raw("cooling_recovery", 2133, Holding),
        // Switch feedback
        RegisterSpec::flag("eco_modus", REG_ECO_MODE, Holding),
        RegisterSpec::flag("heater_switch", REG_HEATER_ENABLE, Holding),
        RegisterSpec::flag("rh_switch", 2146, Holding),
        // Alarms
        alarm("alarm_typeA", 15900),
        alarm("alarm_typeB", 15901),
        alarm("alarm_typeC", 15902),
        alarm("alarm_saf", 15001),
        alarm("alarm_fire", 15536),
        alarm("alarm_eaf", 15008),
        alarm("alarm_saf_rpm", 15029),
        alarm("alarm_eaf_rpm", 15036),
        alarm("alarm_fpt", 15057),
        alarm("alarm_oat", 15064),
        alarm("alarm_sat", 15071),
        alarm("alarm_rat", 15078),
        alarm("alarm_eat", 15085),
        alarm("alarm_ect", 15092),
        alarm("alarm_eft", 15099),
        alarm("alarm_oht", 15106),
        alarm("alarm_emt", 15113),
        alarm("alarm_bys", 15127),
        alarm("alarm_sec_air", 15134),
        alarm("alarm_rh", 15162),
        alarm("alarm_frost_protect", 15015),
        alarm("alarm_defrosting", 15022),
        alarm("alarm_low_SAT", 15176),
        alarm("alarm_pdm_rhs", 15508),
        alarm("alarm_pdm_eat", 15515),
        alarm("alarm_man_fan_stop", 15522),
        alarm("alarm_overheat_temp", 15529),
        alarm("alarm_filter", 15141),
        alarm("alarm_filter_warn", 15543),
        // Sensors
        RegisterSpec::raw("test_mode_reg", REG_USER_MODE, Holding),
        RegisterSpec::raw("sensor_flow_piggyback_saf", 12402, Holding),
        RegisterSpec::raw("sensor_flow_piggyback_eaf", 12403, Holding),
        RegisterSpec::numeric("temp_outdoor", 12101, Holding, 0.1),
        RegisterSpec::numeric("temp_extract", 12543, Holding, 0.1),
        RegisterSpec::numeric("temp_overheat", 12107, Holding, 0.1),
        RegisterSpec::numeric("temp_exhaust", 12105, Holding, 0.1),
        RegisterSpec::raw("humidity", 12135, Holding),
        RegisterSpec::raw("humidity_exhaust", 2210, Holding),
        RegisterSpec::raw("humidity_intake", 2211, Holding),
        RegisterSpec::raw("setpoint_rh_transfer", 2202, Holding),
        RegisterSpec::raw("humidity_return_value", 2200, Holding),
        RegisterSpec::raw("saf_rpm", 12400, Holding),
        RegisterSpec::raw("eaf_rpm", 12401, Holding),
        RegisterSpec::raw("fan_supply", 14000, Holding),
        RegisterSpec::raw("fan_extract", 14001, Holding),
        RegisterSpec::raw("heat_exchanger_state", 14102, Holding),
        RegisterSpec::raw("rotor", 14350, Holding),
        RegisterSpec::raw("heater", 2148, Holding),
        RegisterSpec::raw("filter_replace_month", 7000, Holding),
        RegisterSpec::raw("filter_replace_seconds", 7005, Holding),
        RegisterSpec::numeric("setpoint_eco_offset", 2503, Holding, 0.1),
        RegisterSpec::raw("usermode_remain_time", 1110, Holding),
        RegisterSpec::raw("cooling_recovery_temp", 2314, Holding),
        RegisterSpec::raw("rotor_rotation_speed", 14350, Holding),
        RegisterSpec::raw("heater_percentage", 14101, Holding),
        RegisterSpec::raw("supply_fan_speed", 14001, Holding),
        RegisterSpec::raw("extract_fan_speed", 14002, Holding),
        RegisterSpec::raw("filter_pressure", 12115, Holding),
        RegisterSpec::raw("co2_level", REG_HEATER_ENABLE, Holding),
        RegisterSpec::raw("sfp_supply", 12201, Holding),
        RegisterSpec::raw("remaining_filter_time", 7005, Holding),
        RegisterSpec::raw("defrost_level", 15022, Holding),
        RegisterSpec::raw("exhaust_humidity", 12136, Holding),
        RegisterSpec::raw("intake_humidity", 12137, Holding),
        RegisterSpec::raw("supply_air_pressure", 12112, Holding),
        RegisterSpec::raw("extract_air_pressure", 12113, Holding),
        RegisterSpec::raw("energy_consumption", 7006, Holding),
        RegisterSpec::raw("heat_recovery_efficiency", 12203, Holding),
    ]
}

/// Builds the validated SAVE VSR catalog.
///
/// # Panics
///
/// Panics if the built-in table is inconsistent. That would be a defect in
/// this module, not a runtime condition, so it is asserted at startup.
pub fn vsr_catalog() -> RegisterCatalog {
    RegisterCatalog::new(specs()).expect("built-in VSR register table must be consistent")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Decode, Value, MAX_BATCH_LEN};

    #[test]
    fn test_builtin_table_validates() {
        let catalog = vsr_catalog();
        assert!(catalog.len() > 70);
        assert!(!catalog.batches().is_empty());
    }

    #[test]
    fn test_all_batches_within_limit() {
        let catalog = vsr_catalog();
        for batch in catalog.batches() {
            assert!(batch.count >= 1);
            assert!(batch.count <= MAX_BATCH_LEN);
        }
    }

    #[test]
    fn test_canonical_banks() {
        let catalog = vsr_catalog();
        assert_eq!(catalog.spec("temp_supply").unwrap().bank, Bank::Input);
        assert_eq!(catalog.spec("mode_main").unwrap().bank, Bank::Input);
        assert_eq!(catalog.spec("mode_speed").unwrap().bank, Bank::Input);
        assert_eq!(catalog.spec("target_temp").unwrap().bank, Bank::Holding);
    }

    #[test]
    fn test_switch_aliases() {
        let catalog = vsr_catalog();
        // 2146 feeds a numeric sensor and a switch flag.
        let sensor = catalog.spec("humidity_return").unwrap();
        let switch = catalog.spec("rh_switch").unwrap();
        assert_eq!(sensor.address, switch.address);
        assert_eq!(sensor.decode, Decode::RAW);
        assert_eq!(switch.decode, Decode::Bool);
    }

    #[test]
    fn test_alarm_decoding() {
        let catalog = vsr_catalog();
        let alarm = catalog.spec("alarm_saf").unwrap();
        assert_eq!(alarm.decode(0), Value::Label("Inactive"));
        assert_eq!(alarm.decode(1), Value::Label("Active"));
        assert_eq!(alarm.decode(9), Value::Number(9.0));
    }

    #[test]
    fn test_temperature_scaling() {
        let catalog = vsr_catalog();
        let spec = catalog.spec("temp_supply").unwrap();
        assert_eq!(spec.decode(235), Value::Number(23.5));
    }

    #[test]
    fn test_alarm_block_batches_pack_tightly() {
        // The SAF/EAF alarm cluster 15001..=15036 must collapse into a
        // handful of range reads, not one read per register.
        let catalog = vsr_catalog();
        let alarm_batches: Vec<_> = catalog
            .batches()
            .iter()
            .filter(|b| b.start >= 15000 && b.start < 15200)
            .collect();
        assert!(!alarm_batches.is_empty());
        assert!(alarm_batches.iter().any(|b| b.count > 1));
    }
}
