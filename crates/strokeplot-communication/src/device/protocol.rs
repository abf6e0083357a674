//! Device wire protocol
//!
//! Each message is one line of JSON. Commands are internally tagged by
//! `cmd`; the firmware answers every command with `{"success": bool}` and
//! may add a `message` with diagnostic text.

use serde::{Deserialize, Serialize};
use strokeplot_core::{StrokePoint, TransactionError};

/// One waveform entry as the firmware expects it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformPoint {
    pub x: i32,
    pub y: i32,
    pub delay: u32,
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl From<&StrokePoint> for WaveformPoint {
    fn from(p: &StrokePoint) -> Self {
        // The red channel doubles as the pen-down flag
        Self {
            x: p.x,
            y: p.y,
            delay: p.delay,
            red: p.pen && p.channels.red,
            green: p.pen && p.channels.green,
            blue: p.pen && p.channels.blue,
        }
    }
}

/// A command sent in one device transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum DeviceCommand {
    /// Replace the device's point stream
    SetWaveform { points: Vec<WaveformPoint> },
    /// Set the status LED color
    SetIndicatorLight { r: u8, g: u8, b: u8 },
}

impl DeviceCommand {
    /// Build a waveform command from a serialized stroke stream.
    pub fn waveform(points: &[StrokePoint]) -> Self {
        DeviceCommand::SetWaveform {
            points: points.iter().map(WaveformPoint::from).collect(),
        }
    }

    pub fn indicator_light(r: u8, g: u8, b: u8) -> Self {
        DeviceCommand::SetIndicatorLight { r, g, b }
    }

    /// The `cmd` tag
    pub fn name(&self) -> &'static str {
        match self {
            DeviceCommand::SetWaveform { .. } => "SetWaveform",
            DeviceCommand::SetIndicatorLight { .. } => "SetIndicatorLight",
        }
    }
}

/// The device's answer to one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DeviceResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}

/// Encode a command as one newline-terminated line.
pub fn encode_command(command: &DeviceCommand) -> Result<String, TransactionError> {
    let mut line = serde_json::to_string(command).map_err(|e| TransactionError::Encode {
        reason: e.to_string(),
    })?;
    line.push('\n');
    Ok(line)
}

/// Parse one response line (without its terminator).
///
/// Unknown fields are ignored; a missing `success` is malformed.
pub fn parse_response(line: &str) -> Result<DeviceResponse, TransactionError> {
    let line = line.trim_end_matches('\r');
    serde_json::from_str(line).map_err(|e| TransactionError::MalformedResponse {
        line: line.to_string(),
        reason: e.to_string(),
    })
}
