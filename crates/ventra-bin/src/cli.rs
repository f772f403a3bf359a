// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! Subcommands:
//!
//! - `run`: start the poll loop (default when no subcommand is given)
//! - `validate`: check the configuration file and register catalog
//! - `version`: show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// VENTRA - Modbus RTU adapter for HVAC ventilation units
#[derive(Parser, Debug)]
#[command(
    name = "ventra",
    author,
    version = ventra_core::VERSION,
    about = "Modbus RTU adapter daemon for HVAC ventilation units",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "ventra.yaml",
        env = "VENTRA_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "VENTRA_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format
    #[arg(long, default_value = "text", env = "VENTRA_LOG_FORMAT", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Log format CLI choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable text.
    Text,
    /// JSON lines.
    Json,
    /// Minimal single-line output.
    Compact,
}

impl From<LogFormatArg> for ventra_config::LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Compact => Self::Compact,
        }
    }
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the adapter (default when no subcommand is given)
    Run(RunArgs),

    /// Validate the configuration file and the register catalog
    ///
    /// Parses and validates without opening the serial port. Useful for
    /// checking a configuration before deployment.
    Validate,

    /// Show version information
    Version,
}

/// Arguments for the `run` command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Poll once, print the snapshot as JSON to stdout, and exit
    #[arg(long)]
    pub once: bool,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ventra"]);
        assert_eq!(cli.config, PathBuf::from("ventra.yaml"));
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.log_format, LogFormatArg::Text);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_once() {
        let cli = Cli::parse_from(["ventra", "run", "--once"]);
        match cli.command {
            Some(Commands::Run(args)) => assert!(args.once),
            other => panic!("expected run command, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_with_config() {
        let cli = Cli::parse_from(["ventra", "--config", "/etc/ventra.toml", "validate"]);
        assert_eq!(cli.config, PathBuf::from("/etc/ventra.toml"));
        assert!(matches!(cli.command, Some(Commands::Validate)));
    }

    #[test]
    fn test_cli_asserts() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
