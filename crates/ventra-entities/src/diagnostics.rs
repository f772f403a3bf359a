// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Diagnostics export for support and troubleshooting.
//!
//! The export is the latest snapshot filtered to `alarm_` keys, rendered to
//! JSON so it can be attached to a support ticket verbatim.

use serde_json::{Map, Value as JsonValue};
use ventra_core::{CoordinatorHandle, Value};

/// Renders the alarm view of the latest snapshot as a JSON object.
///
/// Returns `None` before the first successful poll. Absent alarms render as
/// JSON `null`, distinguishing "could not read" from "Inactive".
pub fn alarm_report(handle: &CoordinatorHandle) -> Option<JsonValue> {
    let alarms = handle.alarms()?;

    let mut object = Map::new();
    for (key, value) in alarms {
        let rendered = match value {
            Some(Value::Number(n)) => JsonValue::from(n),
            Some(Value::Bool(b)) => JsonValue::from(b),
            Some(Value::Label(l)) => JsonValue::from(l),
            None => JsonValue::Null,
        };
        object.insert(key.to_string(), rendered);
    }
    Some(JsonValue::Object(object))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use ventra_core::{
        Bank, Bus, PollCoordinator, PollEngine, PollSettings, RegisterCatalog, RegisterSpec,
        WriteGateway,
    };

    use async_trait::async_trait;
    use ventra_modbus::{SerialTransport, TransportResult, TransportState};

    struct FixedTransport;

    #[async_trait]
    impl SerialTransport for FixedTransport {
        async fn connect(&mut self) -> TransportResult<()> {
            Ok(())
        }
        async fn disconnect(&mut self) -> TransportResult<()> {
            Ok(())
        }
        fn is_connected(&self) -> bool {
            true
        }
        fn state(&self) -> TransportState {
            TransportState::Connected
        }
        async fn read_holding_registers(
            &mut self,
            address: u16,
            count: u16,
        ) -> TransportResult<Vec<u16>> {
            // Alarm block reads 1 at its first register, 0 elsewhere.
            Ok((0..count).map(|i| u16::from(address + i == 15001)).collect())
        }
        async fn read_input_registers(
            &mut self,
            _address: u16,
            count: u16,
        ) -> TransportResult<Vec<u16>> {
            Ok(vec![0; count as usize])
        }
        async fn write_single_register(&mut self, _address: u16, _value: u16) -> TransportResult<()> {
            Ok(())
        }
        fn unit_id(&self) -> u8 {
            1
        }
        fn display_name(&self) -> String {
            "fixed".to_string()
        }
    }

    #[tokio::test]
    async fn test_alarm_report_rendering() {
        const STATES: &[(u16, &str)] = &[(0, "Inactive"), (1, "Active")];
        let bus = Bus::new(FixedTransport);
        let catalog = RegisterCatalog::new(vec![
            RegisterSpec::labelled("alarm_saf", 15001, Bank::Holding, STATES),
            RegisterSpec::labelled("alarm_eaf", 15008, Bank::Holding, STATES),
            RegisterSpec::raw("saf_rpm", 12400, Bank::Holding),
        ])
        .unwrap();
        let engine = PollEngine::new(bus.clone(), catalog.into(), PollSettings::default());
        let gateway = WriteGateway::new(bus, Duration::from_secs(1));
        let (coordinator, handle) =
            PollCoordinator::new(engine, gateway, Duration::from_secs(30));

        assert!(alarm_report(&handle).is_none());

        coordinator.poll_once().await;

        let report = alarm_report(&handle).unwrap();
        let object = report.as_object().unwrap();
        // Only alarm keys are exported.
        assert_eq!(object.len(), 2);
        assert_eq!(object["alarm_saf"], "Active");
        assert_eq!(object["alarm_eaf"], "Inactive");
        assert!(!object.contains_key("saf_rpm"));
    }
}
