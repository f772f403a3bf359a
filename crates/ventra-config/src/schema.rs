// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema for the VENTRA adapter.
//!
//! # Schema Structure
//!
//! ```text
//! VentraConfig
//! ├── serial: SerialSettings     (port, line parameters, unit id, timeouts)
//! ├── polling: PollingSettings   (interval, retries, backoff, lifecycle)
//! └── logging: LoggingSettings   (level, format)
//! ```
//!
//! Every struct carries serde defaults so a minimal config is just the
//! serial port path; `validate()` enforces the device's documented limits.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ventra_modbus::{
    DataBits, Parity, RtuConfig, StopBits, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_UNIT_ID, MAX_BAUD_RATE, MIN_BAUD_RATE,
};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Minimum poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Maximum poll interval (1 hour).
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(3600);

/// Default attempts per batch read (first try included).
pub const DEFAULT_READ_ATTEMPTS: u32 = 2;

/// Default backoff between read attempts.
pub const DEFAULT_READ_BACKOFF: Duration = Duration::from_millis(500);

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration for a VENTRA instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VentraConfig {
    /// Serial link settings.
    pub serial: SerialSettings,

    /// Poll loop settings.
    #[serde(default)]
    pub polling: PollingSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl VentraConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.serial.validate()?;
        self.polling.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

// =============================================================================
// Serial Settings
// =============================================================================

/// Serial link parameters, mirroring what the unit's installer menu exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SerialSettings {
    /// Serial port path (e.g. "/dev/ttyUSB0").
    pub port: String,

    /// Baud rate, 9600-19200.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Data bits, 5-8.
    #[serde(default)]
    pub data_bits: DataBits,

    /// Parity: N, E, or O.
    #[serde(default)]
    pub parity: Parity,

    /// Stop bits, 1 or 2.
    #[serde(default)]
    pub stop_bits: StopBits,

    /// Modbus unit id of the ventilation unit.
    #[serde(default = "default_unit_id")]
    pub unit_id: u8,

    /// Deadline for each read/write request.
    #[serde(default = "default_request_timeout")]
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Deadline for (re)establishing the connection.
    #[serde(default = "default_connect_timeout")]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_unit_id() -> u8 {
    DEFAULT_UNIT_ID
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

impl SerialSettings {
    /// Creates settings with defaults for everything but the port.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: default_baud_rate(),
            data_bits: DataBits::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            unit_id: default_unit_id(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }

    /// Validates the serial parameters.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port.is_empty() {
            return Err(ConfigError::invalid("serial.port", "must not be empty"));
        }
        if !(MIN_BAUD_RATE..=MAX_BAUD_RATE).contains(&self.baud_rate) {
            return Err(ConfigError::invalid(
                "serial.baud_rate",
                format!("must be {MIN_BAUD_RATE}-{MAX_BAUD_RATE}, got {}", self.baud_rate),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::invalid(
                "serial.request_timeout",
                "must be non-zero",
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::invalid(
                "serial.connect_timeout",
                "must be non-zero",
            ));
        }
        Ok(())
    }

    /// Converts into the transport crate's configuration.
    pub fn to_rtu_config(&self) -> RtuConfig {
        RtuConfig {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            data_bits: self.data_bits,
            parity: self.parity,
            stop_bits: self.stop_bits,
            unit_id: self.unit_id,
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
        }
    }
}

// =============================================================================
// Polling Settings
// =============================================================================

/// Poll loop tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollingSettings {
    /// Interval between scheduled poll cycles.
    #[serde(default = "default_poll_interval")]
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Total attempts per batch read (first try included).
    #[serde(default = "default_read_attempts")]
    pub read_attempts: u32,

    /// Delay between attempts of the same batch.
    #[serde(default = "default_read_backoff")]
    #[serde(with = "humantime_serde")]
    pub read_backoff: Duration,

    /// Close the serial port after every poll cycle instead of keeping it
    /// open with lazy reconnect.
    #[serde(default)]
    pub close_after_poll: bool,
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_read_attempts() -> u32 {
    DEFAULT_READ_ATTEMPTS
}

fn default_read_backoff() -> Duration {
    DEFAULT_READ_BACKOFF
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            read_attempts: DEFAULT_READ_ATTEMPTS,
            read_backoff: DEFAULT_READ_BACKOFF,
            close_after_poll: false,
        }
    }
}

impl PollingSettings {
    /// Validates the polling parameters.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.interval < MIN_POLL_INTERVAL || self.interval > MAX_POLL_INTERVAL {
            return Err(ConfigError::invalid(
                "polling.interval",
                format!(
                    "must be between {:?} and {:?}, got {:?}",
                    MIN_POLL_INTERVAL, MAX_POLL_INTERVAL, self.interval
                ),
            ));
        }
        if self.read_attempts == 0 {
            return Err(ConfigError::invalid(
                "polling.read_attempts",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// JSON lines for log aggregation.
    Json,
    /// Minimal single-line output.
    Compact,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingSettings {
    /// Validates the logging parameters.
    pub fn validate(&self) -> ConfigResult<()> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "warning" | "error" => Ok(()),
            other => Err(ConfigError::invalid(
                "logging.level",
                format!("unknown level {other:?}"),
            )),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
