//! Device-space strokes.
//!
//! A [`StrokePoint`] is one entry of the timed point stream a plotter
//! executes. Coordinates are integers inside the device's addressable
//! [`DeviceRange`]; only the serializer creates them.

use super::Point;
use crate::error::GeometryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which axis the device mirrors relative to the logical frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisFlip {
    /// No mirroring
    None,
    /// Mirror the X axis
    X,
    /// Mirror the Y axis (screen-style devices with Y growing downwards)
    #[default]
    Y,
}

impl fmt::Display for AxisFlip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
        }
    }
}

/// Integer span the device accepts on each axis
///
/// Logical coordinates in [-1, +1] map affinely onto `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRange {
    min: i32,
    max: i32,
    flip: AxisFlip,
}

impl DeviceRange {
    /// Create a range; `min` must be strictly below `max`.
    pub fn new(min: i32, max: i32, flip: AxisFlip) -> Result<Self, GeometryError> {
        if min >= max {
            return Err(GeometryError::InvalidParameter {
                name: "device_range".to_string(),
                reason: format!("min ({}) must be < max ({})", min, max),
            });
        }
        Ok(Self { min, max, flip })
    }

    /// Range that leaves unit coordinates unchanged: [-1, 1], no flip.
    pub fn identity() -> Self {
        Self {
            min: -1,
            max: 1,
            flip: AxisFlip::None,
        }
    }

    /// 8-bit DAC range 0..=255 with the Y axis mirrored.
    pub fn dac8() -> Self {
        Self {
            min: 0,
            max: 255,
            flip: AxisFlip::Y,
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn flip(&self) -> AxisFlip {
        self.flip
    }

    /// Quantize a normalized point to device coordinates.
    ///
    /// The result is always inside `[min, max]` on both axes.
    pub fn quantize(&self, p: Point) -> (i32, i32) {
        let x = self.quantize_axis(p.x);
        let y = self.quantize_axis(p.y);
        match self.flip {
            AxisFlip::None => (x, y),
            AxisFlip::X => (self.mirror(x), y),
            AxisFlip::Y => (x, self.mirror(y)),
        }
    }

    fn quantize_axis(&self, v: f64) -> i32 {
        let span = f64::from(self.max) - f64::from(self.min);
        let scaled = (v + 1.0) * 0.5 * span + f64::from(self.min);
        // NaN casts to 0 before clamping
        (scaled.round() as i32).clamp(self.min, self.max)
    }

    fn mirror(&self, v: i32) -> i32 {
        self.max - (v - self.min)
    }
}

impl Default for DeviceRange {
    fn default() -> Self {
        Self::dac8()
    }
}

/// Boolean output channels of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Channels {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl Channels {
    /// All channels off.
    pub const OFF: Channels = Channels {
        red: false,
        green: false,
        blue: false,
    };

    pub fn any(&self) -> bool {
        self.red || self.green || self.blue
    }
}

/// One timed entry of a device point stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokePoint {
    /// Device X coordinate
    pub x: i32,
    /// Device Y coordinate
    pub y: i32,
    /// Time budget to travel from the previous point
    pub delay: u32,
    /// Pen down (drawing) when true, travel when false
    pub pen: bool,
    /// Lit channels; all off for travel points
    pub channels: Channels,
}

impl StrokePoint {
    /// Pen-up travel point.
    pub fn travel(x: i32, y: i32, delay: u32) -> Self {
        Self {
            x,
            y,
            delay,
            pen: false,
            channels: Channels::OFF,
        }
    }

    /// Pen-down drawing point.
    pub fn draw(x: i32, y: i32, delay: u32, channels: Channels) -> Self {
        Self {
            x,
            y,
            delay,
            pen: true,
            channels,
        }
    }
}
