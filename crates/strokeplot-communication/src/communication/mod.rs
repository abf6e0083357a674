//! Transport layer
//!
//! Connection parameters and the byte-level [`Transport`] trait the device
//! link drives. The real implementation lives in [`serial`]; tests supply
//! in-memory transports.

pub mod serial;

use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;
use strokeplot_core::ConnectionError;

/// Longest accepted response timeout (one hour)
pub const MAX_TIMEOUT_MS: u64 = 3_600_000;

/// Serial parity setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialParity {
    #[default]
    None,
    Even,
    Odd,
}

/// Serial connection parameters
///
/// Baud rate and line settings are fixed by the device firmware; they are
/// configured, never negotiated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionParams {
    /// Port name, or `"Auto"` for the first USB serial port found
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// How long to wait for a response line (ms)
    pub timeout_ms: u64,
    /// Pause after opening while the device resets (ms)
    pub reset_delay_ms: u64,
    /// Data bits (5-8)
    pub data_bits: u8,
    /// Stop bits (1-2)
    pub stop_bits: u8,
    /// Parity
    pub parity: SerialParity,
    /// Hardware flow control
    pub flow_control: bool,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            port: "Auto".to_string(),
            baud_rate: 115_200,
            timeout_ms: 2000,
            reset_delay_ms: 2000,
            data_bits: 8,
            stop_bits: 1,
            parity: SerialParity::None,
            flow_control: false,
        }
    }
}

impl ConnectionParams {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    /// Check the parameters before touching any hardware.
    pub fn validate(&self) -> Result<(), ConnectionError> {
        let invalid = |reason: String| -> Result<(), ConnectionError> {
            Err(ConnectionError::InvalidParameters { reason })
        };

        if self.port.trim().is_empty() {
            return invalid("port name is empty".to_string());
        }
        if self.baud_rate == 0 {
            return invalid("baud rate must be > 0".to_string());
        }
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return invalid(format!(
                "response timeout must be 1..={} ms, got {}",
                MAX_TIMEOUT_MS, self.timeout_ms
            ));
        }
        if !(5..=8).contains(&self.data_bits) {
            return invalid(format!("invalid data bits: {}", self.data_bits));
        }
        if !(1..=2).contains(&self.stop_bits) {
            return invalid(format!("invalid stop bits: {}", self.stop_bits));
        }
        Ok(())
    }
}

/// Byte-level transport under the device link
///
/// `read` returns `Ok(0)` or an error of kind `TimedOut`/`WouldBlock` when
/// no data is available yet; any other error means the connection is gone.
pub trait Transport: Send {
    /// Write data to the transport
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Read available data
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Flush buffered output
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Drop any unread input
    fn discard_input(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Get the transport name
    fn name(&self) -> String;

    /// Close the transport
    fn close(&mut self) -> io::Result<()>;

    /// Write the whole buffer
    fn write_all(&mut self, mut data: &[u8]) -> io::Result<()> {
        while !data.is_empty() {
            match self.write(data) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "transport accepted no bytes",
                    ))
                }
                Ok(n) => data = &data[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
