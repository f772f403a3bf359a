// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ventra-entities
//!
//! Presentation adapters over the VENTRA snapshot: thin, table-driven views
//! that map snapshot keys into consumer-facing climate, sensor, switch, and
//! binary-sensor values, plus the alarm diagnostics export.
//!
//! Nothing here touches the bus directly. Reads resolve against a
//! [`ventra_core::Snapshot`]; writes go through the
//! [`ventra_core::CoordinatorHandle`] and are followed by a refresh request
//! so the next snapshot reflects the change.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod binary_sensor;
pub mod climate;
pub mod diagnostics;
pub mod sensor;
pub mod switch;

pub use binary_sensor::{binary_sensor, BinaryClass, BinarySensorDef, BINARY_SENSORS};
pub use climate::{ClimateCommands, ClimateState, FanMode, HvacMode, PresetMode};
pub use diagnostics::alarm_report;
pub use sensor::{sensor, SensorCategory, SensorDef, Unit, SENSORS};
pub use switch::{switch, SwitchDef, SWITCHES};
