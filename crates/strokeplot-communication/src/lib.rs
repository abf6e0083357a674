//! # StrokePlot Communication
//!
//! Serial transport and the device link for StrokePlot.
//!
//! The device speaks newline-delimited JSON: one command line in, one
//! response line out, strictly alternating. [`DeviceLink`] enforces that
//! alternation as an explicit state machine over any [`Transport`].

pub mod communication;
pub mod device;

pub use communication::{
    serial::{list_ports, resolve_port, RealSerialPort, SerialPortInfo, UsbIdentity},
    ConnectionParams, SerialParity, Transport, MAX_TIMEOUT_MS,
};
pub use device::{
    link::{DeviceLink, LinkState},
    protocol::{encode_command, parse_response, DeviceCommand, DeviceResponse, WaveformPoint},
};
