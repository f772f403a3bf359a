// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! VENTRA - Modbus RTU adapter daemon for HVAC ventilation units.

use clap::Parser;
use tracing::error;

use ventra_bin::cli::{Cli, Commands, RunArgs};
use ventra_bin::{commands, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_logging(&cli.log_level, cli.log_format.into());

    let result = match cli.command.clone() {
        Some(Commands::Run(args)) => commands::run::run(&cli, args).await,
        None => commands::run::run(&cli, RunArgs::default()).await,
        Some(Commands::Validate) => commands::validate::run(&cli),
        Some(Commands::Version) => commands::version::run(),
    };

    if let Err(err) = result {
        error!(error = %err, "command failed");
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}
