// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Binary-level error type.

use thiserror::Error;

/// Result alias for CLI commands.
pub type BinResult<T> = Result<T, BinError>;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ventra_config::ConfigError),

    /// Transport construction failed.
    #[error(transparent)]
    Transport(#[from] ventra_modbus::TransportError),

    /// A poll cycle invoked directly by a command failed.
    #[error(transparent)]
    Engine(#[from] ventra_core::EngineError),

    /// Serializing output for the terminal failed.
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl BinError {
    /// Exit code reported to the shell.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Transport(_) | Self::Engine(_) => 3,
            Self::Render(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventra_config::ConfigError;

    #[test]
    fn test_exit_codes() {
        let err = BinError::Config(ConfigError::invalid("serial.port", "empty"));
        assert_eq!(err.exit_code(), 2);
    }
}
