// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Serial transport configuration types.
//!
//! [`RtuConfig`] carries everything needed to open the serial link to the
//! ventilation unit: port path, line parameters, the fixed unit id, and the
//! two timeouts every bus operation is bounded by.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TransportError, TransportResult};

// =============================================================================
// Constants
// =============================================================================

/// Default Modbus unit id (slave address) of the ventilation unit.
pub const DEFAULT_UNIT_ID: u8 = 1;

/// Default baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Lowest baud rate the unit supports.
pub const MIN_BAUD_RATE: u32 = 9600;

/// Highest baud rate the unit supports.
pub const MAX_BAUD_RATE: u32 = 19_200;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

// =============================================================================
// Serial line parameters
// =============================================================================

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DataBits {
    /// 5 data bits.
    Five,
    /// 6 data bits.
    Six,
    /// 7 data bits.
    Seven,
    /// 8 data bits.
    Eight,
}

impl Default for DataBits {
    fn default() -> Self {
        Self::Eight
    }
}

impl TryFrom<u8> for DataBits {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            other => Err(format!("data bits must be 5-8, got {other}")),
        }
    }
}

impl From<DataBits> for u8 {
    fn from(v: DataBits) -> u8 {
        match v {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

/// Parity bit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Parity {
    /// No parity bit.
    None,
    /// Even parity.
    Even,
    /// Odd parity.
    Odd,
}

impl Default for Parity {
    fn default() -> Self {
        Self::None
    }
}

impl TryFrom<String> for Parity {
    type Error = String;

    fn try_from(v: String) -> Result<Self, Self::Error> {
        match v.as_str() {
            "N" | "n" | "none" => Ok(Self::None),
            "E" | "e" | "even" => Ok(Self::Even),
            "O" | "o" | "odd" => Ok(Self::Odd),
            other => Err(format!("parity must be one of N/E/O, got {other:?}")),
        }
    }
}

impl From<Parity> for String {
    fn from(v: Parity) -> String {
        match v {
            Parity::None => "N",
            Parity::Even => "E",
            Parity::Odd => "O",
        }
        .to_string()
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StopBits {
    /// 1 stop bit.
    One,
    /// 2 stop bits.
    Two,
}

impl Default for StopBits {
    fn default() -> Self {
        Self::One
    }
}

impl TryFrom<u8> for StopBits {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("stop bits must be 1 or 2, got {other}")),
        }
    }
}

impl From<StopBits> for u8 {
    fn from(v: StopBits) -> u8 {
        match v {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}

// =============================================================================
// RtuConfig
// =============================================================================

/// Configuration of the RTU serial transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtuConfig {
    /// Serial port path (e.g. "/dev/ttyUSB0").
    pub port: String,

    /// Baud rate (9600-19200 for this device family).
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Data bits.
    #[serde(default)]
    pub data_bits: DataBits,

    /// Parity.
    #[serde(default)]
    pub parity: Parity,

    /// Stop bits.
    #[serde(default)]
    pub stop_bits: StopBits,

    /// Modbus unit id (slave address).
    #[serde(default = "default_unit_id")]
    pub unit_id: u8,

    /// Timeout applied to each read/write request.
    #[serde(default = "default_request_timeout")]
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Timeout applied to connection establishment.
    #[serde(default = "default_connect_timeout")]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
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

impl RtuConfig {
    /// Creates a configuration with defaults for everything but the port.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            unit_id: DEFAULT_UNIT_ID,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Creates a new builder.
    pub fn builder() -> RtuConfigBuilder {
        RtuConfigBuilder::default()
    }

    /// Validates the configuration against device constraints.
    pub fn validate(&self) -> TransportResult<()> {
        if self.port.is_empty() {
            return Err(TransportError::Configuration(
                "serial port path is empty".to_string(),
            ));
        }
        if !(MIN_BAUD_RATE..=MAX_BAUD_RATE).contains(&self.baud_rate) {
            return Err(TransportError::Configuration(format!(
                "baud rate {} outside supported range {}-{}",
                self.baud_rate, MIN_BAUD_RATE, MAX_BAUD_RATE
            )));
        }
        if self.request_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(TransportError::Configuration(
                "timeouts must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for RtuConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @{}bps {}{}{} (unit {})",
            self.port,
            self.baud_rate,
            u8::from(self.data_bits),
            String::from(self.parity),
            u8::from(self.stop_bits),
            self.unit_id
        )
    }
}

// =============================================================================
// RtuConfigBuilder
// =============================================================================

/// Builder for [`RtuConfig`].
#[derive(Debug, Default)]
pub struct RtuConfigBuilder {
    port: Option<String>,
    baud_rate: Option<u32>,
    data_bits: Option<DataBits>,
    parity: Option<Parity>,
    stop_bits: Option<StopBits>,
    unit_id: Option<u8>,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl RtuConfigBuilder {
    /// Sets the serial port path.
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// Sets the baud rate.
    pub fn baud_rate(mut self, rate: u32) -> Self {
        self.baud_rate = Some(rate);
        self
    }

    /// Sets the data bits.
    pub fn data_bits(mut self, bits: DataBits) -> Self {
        self.data_bits = Some(bits);
        self
    }

    /// Sets the parity.
    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = Some(parity);
        self
    }

    /// Sets the stop bits.
    pub fn stop_bits(mut self, bits: StopBits) -> Self {
        self.stop_bits = Some(bits);
        self
    }

    /// Sets the unit id.
    pub fn unit_id(mut self, id: u8) -> Self {
        self.unit_id = Some(id);
        self
    }

    /// Sets the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> TransportResult<RtuConfig> {
        let port = self
            .port
            .ok_or_else(|| TransportError::Configuration("port is required".to_string()))?;

        let config = RtuConfig {
            port,
            baud_rate: self.baud_rate.unwrap_or(DEFAULT_BAUD_RATE),
            data_bits: self.data_bits.unwrap_or_default(),
            parity: self.parity.unwrap_or_default(),
            stop_bits: self.stop_bits.unwrap_or_default(),
            unit_id: self.unit_id.unwrap_or(DEFAULT_UNIT_ID),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
        };
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = RtuConfig::builder().port("/dev/ttyUSB0").build().unwrap();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.unit_id, 1);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_requires_port() {
        assert!(RtuConfig::builder().build().is_err());
    }

    #[test]
    fn test_baud_rate_bounds() {
        let err = RtuConfig::builder()
            .port("/dev/ttyUSB0")
            .baud_rate(115_200)
            .build();
        assert!(matches!(err, Err(TransportError::Configuration(_))));

        assert!(RtuConfig::builder()
            .port("/dev/ttyUSB0")
            .baud_rate(19_200)
            .build()
            .is_ok());
    }

    #[test]
    fn test_parity_parsing() {
        assert_eq!(Parity::try_from("N".to_string()).unwrap(), Parity::None);
        assert_eq!(Parity::try_from("even".to_string()).unwrap(), Parity::Even);
        assert_eq!(Parity::try_from("O".to_string()).unwrap(), Parity::Odd);
        assert!(Parity::try_from("X".to_string()).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let yaml = "port: /dev/ttyUSB0\nbaud_rate: 19200\ndata_bits: 8\nparity: E\nstop_bits: 2\n";
        let config: RtuConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.baud_rate, 19_200);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::Even);
        assert_eq!(config.stop_bits, StopBits::Two);
        assert_eq!(config.unit_id, DEFAULT_UNIT_ID);
    }

    #[test]
    fn test_display() {
        let config = RtuConfig::builder()
            .port("/dev/ttyUSB0")
            .baud_rate(19_200)
            .unit_id(5)
            .build()
            .unwrap();
        assert_eq!(config.to_string(), "/dev/ttyUSB0 @19200bps 8N1 (unit 5)");
    }
}
