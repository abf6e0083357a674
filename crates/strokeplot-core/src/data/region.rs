//! Axis-aligned square working area.

use super::Point;
use crate::error::GeometryError;
use serde::{Deserialize, Serialize};

/// Axis-aligned square given by its center and half-extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    center: Point,
    half_extent: f64,
}

impl Region {
    /// Create a region; the half-extent must be finite and positive.
    pub fn new(center: Point, half_extent: f64) -> Result<Self, GeometryError> {
        if !center.is_finite() {
            return Err(GeometryError::NonFinite {
                x: center.x,
                y: center.y,
            });
        }
        if !half_extent.is_finite() || half_extent <= 0.0 {
            return Err(GeometryError::InvalidParameter {
                name: "half_extent".to_string(),
                reason: format!("must be finite and > 0, got {}", half_extent),
            });
        }
        Ok(Self {
            center,
            half_extent,
        })
    }

    /// Square of side `side` centered on the origin.
    pub fn centered(side: f64) -> Result<Self, GeometryError> {
        Self::new(Point::default(), side / 2.0)
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn half_extent(&self) -> f64 {
        self.half_extent
    }

    pub fn min_x(&self) -> f64 {
        self.center.x - self.half_extent
    }

    pub fn max_x(&self) -> f64 {
        self.center.x + self.half_extent
    }

    pub fn min_y(&self) -> f64 {
        self.center.y - self.half_extent
    }

    pub fn max_y(&self) -> f64 {
        self.center.y + self.half_extent
    }

    /// Boundary-inclusive containment test.
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// Map a point of this region onto the symmetric range [-1, +1].
    pub fn normalize(&self, p: Point) -> Point {
        Point {
            x: (p.x - self.center.x) / self.half_extent,
            y: (p.y - self.center.y) / self.half_extent,
        }
    }
}
