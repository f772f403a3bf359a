// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::BinResult;

/// Validates the configuration file, the built-in register catalog, and the
/// entity tables, without touching the serial port.
pub fn run(cli: &Cli) -> BinResult<()> {
    let config = ventra_config::ConfigLoader::new()
        .without_env()
        .load(&cli.config)?;

    // Constructing the catalog re-runs its consistency checks.
    let catalog = ventra_core::vsr_catalog();

    // Every presentation table entry must resolve against the catalog.
    let mut dangling = 0usize;
    for def in ventra_entities::SENSORS {
        if catalog.spec(def.key).is_none() {
            warn!(key = def.key, sensor = def.name, "sensor reads unknown key");
            dangling += 1;
        }
    }
    for def in ventra_entities::SWITCHES {
        if catalog.spec(def.verify_key).is_none() {
            warn!(key = def.verify_key, switch = def.name, "switch verifies unknown key");
            dangling += 1;
        }
    }
    for def in ventra_entities::BINARY_SENSORS {
        if catalog.spec(def.key).is_none() {
            warn!(key = def.key, sensor = def.name, "binary sensor reads unknown key");
            dangling += 1;
        }
    }

    info!(
        config = %cli.config.display(),
        serial = %config.serial.to_rtu_config(),
        registers = catalog.len(),
        batches = catalog.batches().len(),
        dangling_entity_keys = dangling,
        "configuration is valid"
    );
    println!(
        "OK: {} ({} registers in {} batches, polling every {:?})",
        cli.config.display(),
        catalog.len(),
        catalog.batches().len(),
        config.polling.interval
    );
    Ok(())
}
