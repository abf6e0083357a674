//! Serial port transport
//!
//! Port discovery and the `serialport`-backed [`Transport`] used to reach
//! a plotter over USB.
//!
//! Supports:
//! - Port enumeration filtered to USB/ACM/COM devices
//! - `"Auto"` port selection
//! - Baud rate, data bits, stop bits, parity and flow control

use super::{ConnectionParams, SerialParity, Transport};
use std::io::{self, Read, Write};
use std::time::Duration;
use strokeplot_core::{ConnectionError, Result};

/// Read timeout of the underlying port; the link polls on top of it.
const PORT_READ_TIMEOUT: Duration = Duration::from_millis(10);

/// USB identity of a discovered port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbIdentity {
    pub vid: u16,
    pub pid: u16,
    pub manufacturer: Option<String>,
    pub serial_number: Option<String>,
}

/// A port the plotter may be attached to, as shown by `strokeplot ports`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Name to put in `connection.port`
    pub port_name: String,
    /// Label derived from the USB product strings or the port type
    pub description: String,
    /// Present for USB CDC and USB-serial bridge boards
    pub usb: Option<UsbIdentity>,
}

impl SerialPortInfo {
    fn from_listing(port: &serialport::SerialPortInfo) -> Self {
        let usb = match &port.port_type {
            serialport::SerialPortType::UsbPort(usb_info) => Some(UsbIdentity {
                vid: usb_info.vid,
                pid: usb_info.pid,
                manufacturer: usb_info.manufacturer.clone(),
                serial_number: usb_info.serial_number.clone(),
            }),
            _ => None,
        };
        Self {
            port_name: port.port_name.clone(),
            description: port_description(port),
            usb,
        }
    }
}

impl std::fmt::Display for SerialPortInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.port_name, self.description)?;
        if let Some(usb) = &self.usb {
            write!(f, " [{:04x}:{:04x}]", usb.vid, usb.pid)?;
        }
        Ok(())
    }
}

/// Enumerate ports that look like a USB-attached plotter.
///
/// Only names a USB board can show up under are kept: `COM<n>`,
/// `/dev/ttyUSB*`, `/dev/ttyACM*`, `/dev/cu.usbserial-*` and
/// `/dev/cu.usbmodem*`. Built-in UARTs and Bluetooth ports are skipped.
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        ConnectionError::IoError {
            reason: format!("failed to enumerate ports: {}", e),
        }
    })?;

    Ok(ports
        .iter()
        .filter(|port| is_plotter_port(&port.port_name))
        .map(SerialPortInfo::from_listing)
        .collect())
}

/// Resolve `"Auto"` (any case) to the first listed port; other names pass through.
pub fn resolve_port(port: &str) -> Result<String> {
    if !port.eq_ignore_ascii_case("auto") {
        return Ok(port.to_string());
    }

    let ports = list_ports()?;
    match ports.first() {
        Some(info) => {
            tracing::info!("Auto-selected serial port {}", info.port_name);
            Ok(info.port_name.clone())
        }
        None => Err(ConnectionError::PortNotFound {
            port: port.to_string(),
        }
        .into()),
    }
}

fn is_plotter_port(port_name: &str) -> bool {
    if let Some(number) = port_name.strip_prefix("COM") {
        return !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    }

    port_name.starts_with("/dev/ttyUSB")
        || port_name.starts_with("/dev/ttyACM")
        || port_name.starts_with("/dev/cu.usbserial-")
        || port_name.starts_with("/dev/cu.usbmodem")
}

fn port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

fn to_serialport_parity(parity: SerialParity) -> serialport::Parity {
    match parity {
        SerialParity::None => serialport::Parity::None,
        SerialParity::Even => serialport::Parity::Even,
        SerialParity::Odd => serialport::Parity::Odd,
    }
}

/// [`Transport`] over an OS serial device
pub struct RealSerialPort {
    name: String,
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl RealSerialPort {
    /// Open `params.port`, which must already be resolved from `"Auto"`.
    ///
    /// A missing device maps to [`ConnectionError::PortNotFound`], any
    /// other failure to [`ConnectionError::FailedToOpen`].
    pub fn open(params: &ConnectionParams) -> Result<Self> {
        params.validate()?;

        let data_bits = match params.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            _ => serialport::DataBits::Eight,
        };
        let stop_bits = match params.stop_bits {
            2 => serialport::StopBits::Two,
            _ => serialport::StopBits::One,
        };

        let builder = serialport::new(&params.port, params.baud_rate)
            .timeout(PORT_READ_TIMEOUT)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(to_serialport_parity(params.parity))
            .flow_control(if params.flow_control {
                serialport::FlowControl::Hardware
            } else {
                serialport::FlowControl::None
            });

        match builder.open() {
            Ok(port) => {
                tracing::debug!("Opened {} at {} baud", params.port, params.baud_rate);
                Ok(RealSerialPort {
                    name: params.port.clone(),
                    port: Some(port),
                })
            }
            Err(e) => {
                tracing::warn!("Failed to open serial port {}: {}", params.port, e);
                let err = if e.kind() == serialport::ErrorKind::NoDevice {
                    ConnectionError::PortNotFound {
                        port: params.port.clone(),
                    }
                } else {
                    ConnectionError::FailedToOpen {
                        port: params.port.clone(),
                        reason: e.to_string(),
                    }
                };
                Err(err.into())
            }
        }
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn serialport::SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "port is closed"))
    }
}

impl Transport for RealSerialPort {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.port()?.write(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port()?.read(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port()?.flush()
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.port()?
            .clear(serialport::ClearBuffer::Input)
            .map_err(io::Error::from)
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn close(&mut self) -> io::Result<()> {
        // Dropping the handle releases the OS port
        if self.port.take().is_some() {
            tracing::debug!("Closed {}", self.name);
        }
        Ok(())
    }
}
