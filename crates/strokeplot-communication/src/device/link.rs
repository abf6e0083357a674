//! Device Link
//!
//! Strict request/response alternation over a [`Transport`]:
//!
//! ```text
//! Disconnected -> Connected -> AwaitingResponse -> Connected ... -> Disconnected
//! ```
//!
//! A command is written as one line, then exactly one response line is
//! awaited, bounded by the configured timeout. Protocol failures (timeout,
//! malformed response, `success: false`) return the link to `Connected`
//! and are never retried here: the device may already be drawing. Transport
//! failures drop the link to `Disconnected`. Unread input is cleared before
//! each command.

use crate::communication::serial::{resolve_port, RealSerialPort};
use crate::communication::{ConnectionParams, Transport, MAX_TIMEOUT_MS};
use crate::device::protocol::{encode_command, parse_response, DeviceCommand, DeviceResponse};
use std::fmt;
use std::io;
use std::thread;
use std::time::{Duration, Instant};
use strokeplot_core::{ConnectionError, LinkStateError, Result, StrokePoint, TransactionError};
use tracing::{debug, error, info, warn};

/// Sleep between polls when the transport has nothing to read
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Clamp a response timeout so the read deadline stays representable.
fn bounded(timeout: Duration) -> Duration {
    timeout.min(Duration::from_millis(MAX_TIMEOUT_MS))
}

/// Link state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
    AwaitingResponse,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "Disconnected"),
            LinkState::Connected => write!(f, "Connected"),
            LinkState::AwaitingResponse => write!(f, "AwaitingResponse"),
        }
    }
}

/// One session with a plotter
///
/// Owns its transport exclusively and closes it on drop.
pub struct DeviceLink {
    transport: Option<Box<dyn Transport>>,
    state: LinkState,
    timeout: Duration,
}

impl DeviceLink {
    /// A link with no transport attached.
    ///
    /// Timeouts above one hour are clamped.
    pub fn new(timeout: Duration) -> Self {
        Self {
            transport: None,
            state: LinkState::Disconnected,
            timeout: bounded(timeout),
        }
    }

    /// A connected link over an already-open transport.
    pub fn with_transport(transport: Box<dyn Transport>, timeout: Duration) -> Self {
        let mut link = Self::new(timeout);
        link.attach(transport);
        link
    }

    /// Open a serial port and wait for the device to come out of reset.
    pub fn open(params: &ConnectionParams) -> Result<Self> {
        params.validate()?;
        let resolved = ConnectionParams {
            port: resolve_port(&params.port)?,
            ..params.clone()
        };

        let mut port = RealSerialPort::open(&resolved)?;
        if !resolved.reset_delay().is_zero() {
            debug!("Waiting {:?} for device reset", resolved.reset_delay());
            thread::sleep(resolved.reset_delay());
        }
        // Boot chatter is not a response
        if let Err(e) = port.discard_input() {
            warn!("Could not clear input on {}: {}", resolved.port, e);
        }

        info!("Connected to {} at {} baud", resolved.port, resolved.baud_rate);
        Ok(Self::with_transport(Box::new(port), resolved.timeout()))
    }

    /// Attach a transport to a disconnected link.
    pub fn connect(&mut self, transport: Box<dyn Transport>) -> Result<()> {
        self.require(LinkState::Disconnected, "connect")?;
        self.attach(transport);
        Ok(())
    }

    fn attach(&mut self, transport: Box<dyn Transport>) {
        debug!("Link attached to {}", transport.name());
        self.transport = Some(transport);
        self.state = LinkState::Connected;
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state != LinkState::Disconnected
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = bounded(timeout);
    }

    /// Transmit one command line. Moves `Connected -> AwaitingResponse`.
    pub fn send(&mut self, command: &DeviceCommand) -> Result<()> {
        self.require(LinkState::Connected, "send")?;
        let line = encode_command(command)?;

        debug!("-> {} ({} bytes)", command.name(), line.len());
        let written = match self.transport.as_mut() {
            Some(transport) => {
                // Late or trailing bytes of an earlier reply
                if let Err(e) = transport.discard_input() {
                    warn!("Could not clear stale input: {}", e);
                }
                transport
                    .write_all(line.as_bytes())
                    .and_then(|_| transport.flush())
            }
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "no transport")),
        };
        if let Err(e) = written {
            return Err(self.fail_transport("write", e));
        }

        self.state = LinkState::AwaitingResponse;
        Ok(())
    }

    /// Wait for the response line. Moves `AwaitingResponse -> Connected`.
    ///
    /// `success: false` is returned as [`TransactionError::Rejected`].
    pub fn receive(&mut self) -> Result<DeviceResponse> {
        self.require(LinkState::AwaitingResponse, "receive")?;

        let line = match self.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => {
                self.state = LinkState::Connected;
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!("No response within {}ms", timeout_ms);
                return Err(TransactionError::Timeout { timeout_ms }.into());
            }
            Err(e) => return Err(self.fail_transport("read", e)),
        };
        self.state = LinkState::Connected;

        debug!("<- {}", line);
        let response = parse_response(&line)?;
        if !response.success {
            warn!("Device rejected command: {:?}", response.message);
            return Err(TransactionError::Rejected {
                message: response.message,
            }
            .into());
        }
        Ok(response)
    }

    /// Send a command and wait for its response.
    pub fn transact(&mut self, command: &DeviceCommand) -> Result<DeviceResponse> {
        self.send(command)?;
        self.receive()
    }

    /// Send a stroke stream as a `SetWaveform` command.
    pub fn draw(&mut self, points: &[StrokePoint]) -> Result<DeviceResponse> {
        info!("Sending waveform with {} points", points.len());
        self.transact(&DeviceCommand::waveform(points))
    }

    /// Set the indicator light.
    pub fn set_indicator_light(&mut self, r: u8, g: u8, b: u8) -> Result<DeviceResponse> {
        self.transact(&DeviceCommand::indicator_light(r, g, b))
    }

    /// Close the transport. Safe to call in any state.
    pub fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close() {
                warn!("Error closing {}: {}", transport.name(), e);
            }
            debug!("Link to {} closed", transport.name());
        }
        self.state = LinkState::Disconnected;
    }

    fn require(&self, expected: LinkState, operation: &str) -> Result<()> {
        if self.state == expected {
            return Ok(());
        }
        Err(LinkStateError::InvalidState {
            operation: operation.to_string(),
            state: self.state.to_string(),
        }
        .into())
    }

    /// Accumulate bytes until a newline or the deadline.
    ///
    /// `Ok(None)` means timeout. Bytes after the first newline are dropped.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no transport"))?;

        let deadline = Instant::now() + self.timeout;
        let mut buffer: Vec<u8> = Vec::new();
        let mut chunk = [0u8; 256];

        while Instant::now() < deadline {
            match transport.read(&mut chunk) {
                Ok(0) => thread::sleep(POLL_INTERVAL),
                Ok(n) => {
                    let data = &chunk[..n];
                    if let Some(pos) = data.iter().position(|&b| b == b'\n') {
                        buffer.extend_from_slice(&data[..pos]);
                        if pos + 1 < n {
                            debug!("Discarding {} bytes after response", n - pos - 1);
                        }
                        return Ok(Some(String::from_utf8_lossy(&buffer).into_owned()));
                    }
                    buffer.extend_from_slice(data);
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut
                            | io::ErrorKind::WouldBlock
                            | io::ErrorKind::Interrupted
                    ) =>
                {
                    thread::sleep(POLL_INTERVAL)
                }
                Err(e) => return Err(e),
            }
        }

        if !buffer.is_empty() {
            debug!("Partial response discarded: {} bytes", buffer.len());
        }
        Ok(None)
    }

    fn fail_transport(&mut self, operation: &str, e: io::Error) -> strokeplot_core::Error {
        error!("Transport {} failed: {}", operation, e);
        self.close();
        ConnectionError::ConnectionLost {
            reason: format!("{} failed: {}", operation, e),
        }
        .into()
    }
}

impl Drop for DeviceLink {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for DeviceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceLink")
            .field("transport", &self.transport.as_ref().map(|t| t.name()))
            .field("state", &self.state)
            .field("timeout", &self.timeout)
            .finish()
    }
}
