//! Planar data model
//!
//! Points and polylines in a real-valued planar frame, the RGB color a
//! polyline may carry, and re-exports of the region and device-space
//! stroke types.

mod region;
mod stroke;

pub use region::Region;
pub use stroke::{AxisFlip, Channels, DeviceRange, StrokePoint};

use crate::error::GeometryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A planar coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point with the given X and Y coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// True when both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Linear interpolation towards `other` at parameter `t`.
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// RGB color attached to a polyline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Pure red, the conventional pen-down channel.
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };

    /// Creates a color from components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel flags for this color; a channel is lit when its component is >= 128.
    pub fn channels(&self) -> Channels {
        Channels {
            red: self.r >= 128,
            green: self.g >= 128,
            blue: self.b >= 128,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parses `#RRGGBB` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Expected #RRGGBB, got '{}'", s));
        }

        let rgb = u32::from_str_radix(hex, 16).map_err(|e| e.to_string())?;
        Ok(Color {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        })
    }
}

/// An ordered sequence of at least two points
///
/// Direction is significant but a reversed polyline describes the same
/// stroke. The two-point minimum is enforced at construction, and every
/// mutating method preserves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPolyline", into = "RawPolyline")]
pub struct Polyline {
    points: Vec<Point>,
    color: Option<Color>,
}

impl Polyline {
    /// Create a polyline, rejecting fewer than two points.
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() < 2 {
            return Err(GeometryError::Degenerate {
                points: points.len(),
            });
        }
        Ok(Self {
            points,
            color: None,
        })
    }

    /// Create a polyline from coordinate pairs.
    pub fn from_coords(coords: &[(f64, f64)]) -> Result<Self, GeometryError> {
        Self::new(coords.iter().copied().map(Point::from).collect())
    }

    /// Set the color
    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Never true for a constructed polyline.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Total drawn length.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    /// First non-finite point, if any.
    pub fn find_non_finite(&self) -> Option<Point> {
        self.points.iter().copied().find(|p| !p.is_finite())
    }

    /// Reverse direction in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Append `other` after this polyline's end, skipping `other`'s first
    /// point (the shared junction).
    pub fn append_joined(&mut self, other: &[Point]) {
        self.points.extend_from_slice(&other[1..]);
    }

    /// Prepend `other` before this polyline's start, skipping `other`'s
    /// last point (the shared junction).
    pub fn prepend_joined(&mut self, other: &[Point]) {
        let mut joined = Vec::with_capacity(self.points.len() + other.len() - 1);
        joined.extend_from_slice(&other[..other.len() - 1]);
        joined.append(&mut self.points);
        self.points = joined;
    }

    /// Map every point through `f`, keeping the color.
    pub fn map_points(self, f: impl Fn(Point) -> Point) -> Self {
        Self {
            points: self.points.into_iter().map(f).collect(),
            color: self.color,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawPolyline {
    points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
}

impl TryFrom<RawPolyline> for Polyline {
    type Error = GeometryError;

    fn try_from(raw: RawPolyline) -> Result<Self, Self::Error> {
        Ok(Polyline::new(raw.points)?.with_color(raw.color))
    }
}

impl From<Polyline> for RawPolyline {
    fn from(line: Polyline) -> Self {
        RawPolyline {
            points: line.points,
            color: line.color,
        }
    }
}
