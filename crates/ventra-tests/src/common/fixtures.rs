// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Shared fixtures: catalogs, engine stacks, and fast poll settings.

use std::sync::Arc;
use std::time::Duration;

use ventra_core::{
    Bank, Bus, PollEngine, PollSettings, RegisterCatalog, RegisterSpec, SharedBus, WriteGateway,
};

use super::mocks::{MockHandle, MockTransport};

/// Fan speed labels used across the fixtures.
pub const SPEED_LABELS: &[(u16, &str)] = &[(0, "Off"), (2, "Low"), (3, "Medium"), (4, "High")];

/// Poll settings tuned for fast tests: same attempt policy as production,
/// millisecond backoff.
pub fn fast_settings() -> PollSettings {
    PollSettings {
        attempts: 2,
        backoff: Duration::from_millis(1),
        connect_timeout: Duration::from_millis(200),
        close_after_poll: false,
    }
}

/// One-batch catalog: the `target_temp` setpoint at holding 2000.
pub fn setpoint_catalog() -> Arc<RegisterCatalog> {
    Arc::new(
        RegisterCatalog::new(vec![RegisterSpec::numeric(
            "target_temp",
            2000,
            Bank::Holding,
            0.1,
        )])
        .unwrap(),
    )
}

/// Multi-batch catalog exercising every decode kind across three banks of
/// addresses: setpoint, supply temperature, fan mode, and the ECO switch.
pub fn mixed_catalog() -> Arc<RegisterCatalog> {
    Arc::new(
        RegisterCatalog::new(vec![
            RegisterSpec::numeric("target_temp", 2000, Bank::Holding, 0.1),
            RegisterSpec::numeric("temp_supply", 12102, Bank::Input, 0.1),
            RegisterSpec::labelled("mode_speed", 1130, Bank::Input, SPEED_LABELS),
            RegisterSpec::flag("eco_modus", 2504, Bank::Holding),
            RegisterSpec::raw("saf_rpm", 12400, Bank::Holding),
        ])
        .unwrap(),
    )
}

/// Builds a full engine stack over a fresh mock transport.
pub fn engine_stack(
    catalog: Arc<RegisterCatalog>,
    latency: Duration,
) -> (SharedBus, PollEngine, WriteGateway, MockHandle) {
    engine_stack_with(catalog, latency, fast_settings())
}

/// Builds an engine stack with explicit poll settings.
pub fn engine_stack_with(
    catalog: Arc<RegisterCatalog>,
    latency: Duration,
    settings: PollSettings,
) -> (SharedBus, PollEngine, WriteGateway, MockHandle) {
    let (transport, handle) = MockTransport::with_latency(latency);
    let bus = Bus::new(transport);
    let connect_timeout = settings.connect_timeout;
    let engine = PollEngine::new(bus.clone(), catalog, settings);
    let gateway = WriteGateway::new(bus.clone(), connect_timeout);
    (bus, engine, gateway, handle)
}
