//! Coordinate frames
//!
//! Geographic input (longitude in `x`, latitude in `y`) is projected to a
//! local planar frame in meters with an equirectangular approximation
//! around a reference point. Planar input (text strokes) passes through.
//! After ordering, [`normalize`] maps region-local coordinates to the
//! symmetric unit square the serializer expects.

use serde::{Deserialize, Serialize};
use strokeplot_core::{Point, Polyline, Region};

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A geographic reference point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// How input coordinates relate to the clipping frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Projection {
    /// Coordinates are already planar
    #[default]
    Planar,
    /// `x` is longitude and `y` latitude, projected around `origin`
    Geographic { origin: GeoPoint },
}

impl Projection {
    /// Project a single point into the local planar frame.
    pub fn project_point(&self, p: Point) -> Point {
        match self {
            Projection::Planar => p,
            Projection::Geographic { origin } => {
                let lon_scale = origin.lat.to_radians().cos() * METERS_PER_DEGREE;
                Point::new(
                    (p.x - origin.lon) * lon_scale,
                    (p.y - origin.lat) * METERS_PER_DEGREE,
                )
            }
        }
    }

    /// Project every point of a polyline, keeping its color.
    pub fn project(&self, line: Polyline) -> Polyline {
        match self {
            Projection::Planar => line,
            Projection::Geographic { .. } => line.map_points(|p| self.project_point(p)),
        }
    }
}

/// Convert a distance in meters to `(degrees latitude, degrees longitude)`
/// at latitude `lat`.
///
/// Upstream fetchers use this to size a geographic bounding box around a
/// square region.
pub fn meters_to_degrees(lat: f64, meters: f64) -> (f64, f64) {
    let per_deg_lon = METERS_PER_DEGREE * lat.to_radians().cos();
    (meters / METERS_PER_DEGREE, meters / per_deg_lon)
}

/// Map region-local coordinates onto [-1, +1] on both axes.
pub fn normalize(polylines: Vec<Polyline>, region: &Region) -> Vec<Polyline> {
    polylines
        .into_iter()
        .map(|line| line.map_points(|p| region.normalize(p)))
        .collect()
}
