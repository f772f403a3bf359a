// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::error::BinResult;

/// Prints version information for all components.
pub fn run() -> BinResult<()> {
    println!("ventra {}", ventra_core::VERSION);
    println!("  ventra-core    {}", ventra_core::VERSION);
    println!("  ventra-modbus  {}", ventra_modbus::VERSION);
    println!("  ventra-config  {}", ventra_config::VERSION);
    Ok(())
}
