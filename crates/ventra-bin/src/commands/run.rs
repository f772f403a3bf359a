// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use std::sync::Arc;

use tracing::info;
use ventra_config::VentraConfig;
use ventra_core::{
    Bus, PollCoordinator, PollEngine, PollSettings, SharedBus, WriteGateway,
};
use ventra_modbus::RtuTransport;

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::shutdown::shutdown_signal;

/// Builds the engine stack from configuration.
fn build(config: &VentraConfig) -> BinResult<(SharedBus, PollEngine, WriteGateway)> {
    let rtu_config = config.serial.to_rtu_config();
    rtu_config.validate()?;

    let bus = Bus::new(RtuTransport::new(rtu_config));
    let catalog = Arc::new(ventra_core::vsr_catalog());

    let settings = PollSettings {
        attempts: config.polling.read_attempts,
        backoff: config.polling.read_backoff,
        connect_timeout: config.serial.connect_timeout,
        close_after_poll: config.polling.close_after_poll,
    };

    let engine = PollEngine::new(bus.clone(), catalog, settings);
    let gateway = WriteGateway::new(bus.clone(), config.serial.connect_timeout);
    Ok((bus, engine, gateway))
}

/// Starts the adapter, or polls once with `--once`.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    let config = ventra_config::ConfigLoader::new().load(&cli.config)?;
    let (bus, engine, gateway) = build(&config)?;

    if args.once {
        return poll_once(&bus, &engine).await;
    }

    info!(
        serial = %config.serial.to_rtu_config(),
        interval = ?config.polling.interval,
        "starting VENTRA adapter"
    );

    let (coordinator, handle) =
        PollCoordinator::new(engine, gateway, config.polling.interval);

    coordinator.run(shutdown_signal()).await;

    if let Some(snapshot) = handle.latest() {
        info!(
            keys = snapshot.len(),
            fresh = handle.is_fresh(),
            "final snapshot retained"
        );
    }
    bus.shutdown().await;
    Ok(())
}

/// One poll cycle, printed as JSON. Diagnostics helper for commissioning.
async fn poll_once(bus: &SharedBus, engine: &PollEngine) -> BinResult<()> {
    let snapshot = engine.poll().await?;

    let mut object = serde_json::Map::new();
    for (key, value) in snapshot.iter() {
        let rendered = match value {
            Some(ventra_core::Value::Number(n)) => serde_json::Value::from(n),
            Some(ventra_core::Value::Bool(b)) => serde_json::Value::from(b),
            Some(ventra_core::Value::Label(l)) => serde_json::Value::from(l),
            None => serde_json::Value::Null,
        };
        object.insert(key.to_string(), rendered);
    }
    println!("{}", serde_json::to_string_pretty(&object)?);

    bus.shutdown().await;
    Ok(())
}
