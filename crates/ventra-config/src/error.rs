// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not map to a supported format.
    #[error("unsupported config format {extension:?} (expected yaml, yml, or toml)")]
    UnsupportedFormat {
        /// The offending extension.
        extension: String,
    },

    /// The file content failed to parse.
    #[error("failed to parse {format} config: {message}")]
    Parse {
        /// Format that was being parsed.
        format: &'static str,
        /// Parser error description.
        message: String,
    },

    /// A field value is outside its allowed range or shape.
    #[error("invalid value for {field}: {message}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// An environment variable override could not be applied.
    #[error("invalid environment override {variable}: {message}")]
    EnvOverride {
        /// Name of the environment variable.
        variable: String,
        /// Why the value was rejected.
        message: String,
    },
}

impl ConfigError {
    /// Creates an [`ConfigError::Invalid`] error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }

    /// Creates an [`ConfigError::EnvOverride`] error.
    pub fn env_override(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EnvOverride {
            variable: variable.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_display() {
        let err = ConfigError::invalid("serial.baud_rate", "must be 9600-19200");
        assert_eq!(
            err.to_string(),
            "invalid value for serial.baud_rate: must be 9600-19200"
        );
    }
}
