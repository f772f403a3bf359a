// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and detect the format from its extension
//! 2. Parse YAML or TOML into [`VentraConfig`]
//! 3. Apply `VENTRA_*` environment variable overrides
//! 4. Validate
//!
//! # Environment Variable Overrides
//!
//! ```text
//! VENTRA_SERIAL_PORT=/dev/ttyAMA0
//! VENTRA_SERIAL_BAUD_RATE=19200
//! VENTRA_SERIAL_UNIT_ID=2
//! VENTRA_POLL_INTERVAL=15s
//! VENTRA_LOG_LEVEL=debug
//! VENTRA_LOG_FORMAT=json
//! ```

use std::env;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::schema::VentraConfig;

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (`.yaml` / `.yml`).
    Yaml,
    /// TOML (`.toml`).
    Toml,
}

impl ConfigFormat {
    /// Detects the format from a file path's extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat {
                extension: other.unwrap_or("").to_string(),
            }),
        }
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loads, overrides, and validates adapter configuration.
///
/// # Examples
///
/// ```no_run
/// use ventra_config::ConfigLoader;
///
/// let config = ConfigLoader::new().load("ventra.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    apply_env: bool,
}

impl ConfigLoader {
    /// Creates a loader with the default `VENTRA` environment prefix.
    pub fn new() -> Self {
        Self {
            env_prefix: "VENTRA".to_string(),
            apply_env: true,
        }
    }

    /// Overrides the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Disables environment variable overrides (used by `validate` runs that
    /// must report exactly what the file says).
    pub fn without_env(mut self) -> Self {
        self.apply_env = false;
        self
    }

    /// Loads a configuration file.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<VentraConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = self.parse(&content, format)?;

        if self.apply_env {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parses configuration from a string.
    pub fn parse(&self, content: &str, format: ConfigFormat) -> ConfigResult<VentraConfig> {
        match format {
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
                    format: "yaml",
                    message: e.to_string(),
                })
            }
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::Parse {
                format: "toml",
                message: e.to_string(),
            }),
        }
    }

    fn env_var(&self, suffix: &str) -> Option<(String, String)> {
        let name = format!("{}_{}", self.env_prefix, suffix);
        env::var(&name).ok().map(|value| (name, value))
    }

    fn apply_env_overrides(&self, config: &mut VentraConfig) -> ConfigResult<()> {
        if let Some((_, value)) = self.env_var("SERIAL_PORT") {
            config.serial.port = value;
        }
        if let Some((name, value)) = self.env_var("SERIAL_BAUD_RATE") {
            config.serial.baud_rate = value
                .parse()
                .map_err(|_| ConfigError::env_override(name, "expected an integer"))?;
        }
        if let Some((name, value)) = self.env_var("SERIAL_UNIT_ID") {
            config.serial.unit_id = value
                .parse()
                .map_err(|_| ConfigError::env_override(name, "expected an integer"))?;
        }
        if let Some((name, value)) = self.env_var("POLL_INTERVAL") {
            config.polling.interval = humantime::parse_duration(&value)
                .map_err(|e| ConfigError::env_override(name, e.to_string()))?;
        }
        if let Some((_, value)) = self.env_var("LOG_LEVEL") {
            config.logging.level = value;
        }
        if let Some((name, value)) = self.env_var("LOG_FORMAT") {
            config.logging.format = value
                .parse()
                .map_err(|e: String| ConfigError::env_override(name, e))?;
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
