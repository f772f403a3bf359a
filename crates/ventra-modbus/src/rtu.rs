// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus RTU transport over a serial port.
//!
//! Wire framing, CRC, and inter-frame timing are delegated to `tokio-modbus`;
//! this module owns connection lifecycle, per-request timeouts, and mapping
//! of library errors into [`TransportError`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tokio_modbus::client::{Context as ModbusContext, Reader, Writer};
use tokio_modbus::prelude::*;
use tokio_modbus::{Error as ModbusLibError, ExceptionCode};
use tokio_serial::{
    DataBits as SerialDataBits, Parity as SerialParity, SerialPortBuilderExt,
    StopBits as SerialStopBits,
};

use crate::error::{TransportError, TransportResult};
use crate::transport::{SerialTransport, TransportState};
use crate::types::{DataBits, Parity, RtuConfig, StopBits};

// =============================================================================
// RtuTransport
// =============================================================================

/// Modbus RTU transport using `tokio-modbus` over a `tokio-serial` port.
///
/// The transport holds at most one open serial context. The poll engine
/// serializes access through its bus lock, so no internal locking is needed
/// here; exclusive access is expressed through `&mut self`.
pub struct RtuTransport {
    config: RtuConfig,
    context: Option<ModbusContext>,
    state: TransportState,
}

impl RtuTransport {
    /// Creates a new disconnected RTU transport.
    pub fn new(config: RtuConfig) -> Self {
        Self {
            config,
            context: None,
            state: TransportState::Disconnected,
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &RtuConfig {
        &self.config
    }

    fn convert_data_bits(bits: DataBits) -> SerialDataBits {
        match bits {
            DataBits::Five => SerialDataBits::Five,
            DataBits::Six => SerialDataBits::Six,
            DataBits::Seven => SerialDataBits::Seven,
            DataBits::Eight => SerialDataBits::Eight,
        }
    }

    fn convert_parity(parity: Parity) -> SerialParity {
        match parity {
            Parity::None => SerialParity::None,
            Parity::Even => SerialParity::Even,
            Parity::Odd => SerialParity::Odd,
        }
    }

    fn convert_stop_bits(bits: StopBits) -> SerialStopBits {
        match bits {
            StopBits::One => SerialStopBits::One,
            StopBits::Two => SerialStopBits::Two,
        }
    }

    fn map_open_error(&self, e: tokio_serial::Error) -> TransportError {
        match e.kind {
            tokio_serial::ErrorKind::NoDevice => TransportError::PortNotFound {
                port: self.config.port.clone(),
            },
            tokio_serial::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                TransportError::AccessDenied {
                    port: self.config.port.clone(),
                }
            }
            tokio_serial::ErrorKind::Io(std::io::ErrorKind::NotFound) => {
                TransportError::PortNotFound {
                    port: self.config.port.clone(),
                }
            }
            _ => TransportError::PortSetup {
                port: self.config.port.clone(),
                message: e.to_string(),
            },
        }
    }

    fn map_lib_error(&mut self, error: ModbusLibError, operation: &'static str) -> TransportError {
        match error {
            ModbusLibError::Transport(io_error) => {
                use std::io::ErrorKind;
                match io_error.kind() {
                    ErrorKind::TimedOut => TransportError::Timeout {
                        operation,
                        timeout: self.config.request_timeout,
                    },
                    ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::NotFound => {
                        // The port went away underneath us; force a reconnect.
                        self.context = None;
                        self.state = TransportState::Error;
                        TransportError::ConnectionLost(io_error.to_string())
                    }
                    _ => TransportError::Io {
                        operation,
                        source: io_error,
                    },
                }
            }
            ModbusLibError::Protocol(protocol_error) => TransportError::Io {
                operation,
                source: std::io::Error::other(format!("protocol violation: {protocol_error:?}")),
            },
        }
    }

    fn map_exception(exception: ExceptionCode) -> TransportError {
        let code = match exception {
            ExceptionCode::IllegalFunction => 0x01,
            ExceptionCode::IllegalDataAddress => 0x02,
            ExceptionCode::IllegalDataValue => 0x03,
            ExceptionCode::ServerDeviceFailure => 0x04,
            ExceptionCode::Acknowledge => 0x05,
            ExceptionCode::ServerDeviceBusy => 0x06,
            ExceptionCode::MemoryParityError => 0x08,
            ExceptionCode::GatewayPathUnavailable => 0x0A,
            ExceptionCode::GatewayTargetDevice => 0x0B,
            _ => 0xFF,
        };
        TransportError::Exception { code }
    }

    fn context_mut(&mut self) -> TransportResult<&mut ModbusContext> {
        self.context.as_mut().ok_or(TransportError::NotConnected)
    }

    async fn bounded<F, T>(deadline: Duration, operation: &'static str, fut: F) -> TransportResult<T>
    where
        F: std::future::Future<Output = T>,
    {
        timeout(deadline, fut).await.map_err(|_| TransportError::Timeout {
            operation,
            timeout: deadline,
        })
    }
}

#[async_trait]
impl SerialTransport for RtuTransport {
    async fn connect(&mut self) -> TransportResult<()> {
        if self.state == TransportState::Connected && self.context.is_some() {
            return Ok(());
        }

        self.state = TransportState::Connecting;

        let builder = tokio_serial::new(&self.config.port, self.config.baud_rate)
            .data_bits(Self::convert_data_bits(self.config.data_bits))
            .parity(Self::convert_parity(self.config.parity))
            .stop_bits(Self::convert_stop_bits(self.config.stop_bits));

        let serial = builder.open_native_async().map_err(|e| {
            self.state = TransportState::Disconnected;
            self.map_open_error(e)
        })?;

        let slave = Slave(self.config.unit_id);
        self.context = Some(rtu::attach_slave(serial, slave));
        self.state = TransportState::Connected;

        tracing::info!(
            port = %self.config.port,
            baud_rate = self.config.baud_rate,
            unit_id = self.config.unit_id,
            "connected to ventilation unit"
        );

        Ok(())
    }

    async fn disconnect(&mut self) -> TransportResult<()> {
        if let Some(mut ctx) = self.context.take() {
            if let Err(e) = ctx.disconnect().await {
                tracing::warn!(error = %e, "error closing serial port");
            }
        }
        self.state = TransportState::Disconnected;
        tracing::debug!(port = %self.config.port, "serial port closed");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state == TransportState::Connected && self.context.is_some()
    }

    fn state(&self) -> TransportState {
        self.state
    }

    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> TransportResult<Vec<u16>> {
        let deadline = self.config.request_timeout;
        let response = {
            let ctx = self.context_mut()?;
            Self::bounded(
                deadline,
                "read_holding_registers",
                ctx.read_holding_registers(address, count),
            )
            .await?
        };
        let words = response
            .map_err(|e| self.map_lib_error(e, "read_holding_registers"))?
            .map_err(Self::map_exception)?;
        Ok(words)
    }

    async fn read_input_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> TransportResult<Vec<u16>> {
        let deadline = self.config.request_timeout;
        let response = {
            let ctx = self.context_mut()?;
            Self::bounded(
                deadline,
                "read_input_registers",
                ctx.read_input_registers(address, count),
            )
            .await?
        };
        let words = response
            .map_err(|e| self.map_lib_error(e, "read_input_registers"))?
            .map_err(Self::map_exception)?;
        Ok(words)
    }

    async fn write_single_register(&mut self, address: u16, value: u16) -> TransportResult<()> {
        let deadline = self.config.request_timeout;
        let response = {
            let ctx = self.context_mut()?;
            Self::bounded(
                deadline,
                "write_single_register",
                ctx.write_single_register(address, value),
            )
            .await?
        };
        response
            .map_err(|e| self.map_lib_error(e, "write_single_register"))?
            .map_err(Self::map_exception)?;
        Ok(())
    }

    fn unit_id(&self) -> u8 {
        self.config.unit_id
    }

    fn display_name(&self) -> String {
        self.config.to_string()
    }
}

impl std::fmt::Debug for RtuTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtuTransport")
            .field("port", &self.config.port)
            .field("baud_rate", &self.config.baud_rate)
            .field("unit_id", &self.config.unit_id)
            .field("state", &self.state)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_disconnected() {
        let transport = RtuTransport::new(RtuConfig::new("/dev/ttyUSB0"));
        assert!(!transport.is_connected());
        assert_eq!(transport.state(), TransportState::Disconnected);
        assert_eq!(transport.unit_id(), 1);
    }

    #[tokio::test]
    async fn test_read_without_connection_fails() {
        let mut transport = RtuTransport::new(RtuConfig::new("/dev/ttyUSB0"));
        let result = transport.read_holding_registers(2000, 1).await;
        assert!(matches!(result, Err(TransportError::NotConnected)));
    }

    #[tokio::test]
    async fn test_write_without_connection_fails() {
        let mut transport = RtuTransport::new(RtuConfig::new("/dev/ttyUSB0"));
        let result = transport.write_single_register(2504, 1).await;
        assert!(matches!(result, Err(TransportError::NotConnected)));
    }

    #[tokio::test]
    async fn test_disconnect_when_disconnected_is_noop() {
        let mut transport = RtuTransport::new(RtuConfig::new("/dev/ttyUSB0"));
        assert!(transport.disconnect().await.is_ok());
        assert_eq!(transport.state(), TransportState::Disconnected);
    }

    #[test]
    fn test_exception_mapping() {
        let err = RtuTransport::map_exception(ExceptionCode::IllegalDataAddress);
        assert!(matches!(err, TransportError::Exception { code: 0x02 }));
    }

    #[test]
    fn test_debug_impl() {
        let transport = RtuTransport::new(RtuConfig::new("/dev/ttyUSB0"));
        let s = format!("{:?}", transport);
        assert!(s.contains("/dev/ttyUSB0"));
        assert!(s.contains("9600"));
    }
}
