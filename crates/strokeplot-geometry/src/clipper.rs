//! Geometry Clipper
//!
//! Projects raw polylines into the local planar frame and clips them
//! against a square [`Region`]. Clipping works segment by segment with the
//! Liang-Barsky algorithm, so a polyline that leaves and re-enters the
//! region becomes several sub-polylines whose ends lie on the boundary.
//! Dropping outside vertices instead would bridge the gap with a chord.

use crate::projection::Projection;
use strokeplot_core::{Point, Polyline, Region};
use tracing::{debug, info, warn};

/// What the clipper did to one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipReport {
    /// Polylines received
    pub input: usize,
    /// Polylines emitted
    pub output: usize,
    /// Polylines dropped for NaN or infinite coordinates
    pub dropped_non_finite: usize,
    /// Pieces dropped for having fewer than two points, including segments
    /// that only touch the boundary
    pub dropped_degenerate: usize,
    /// Input polylines that came out as more than one piece
    pub split: usize,
}

/// Projects and clips polylines to a region
#[derive(Debug, Clone, Copy)]
pub struct Clipper {
    region: Region,
    projection: Projection,
}

impl Clipper {
    /// Clipper for planar input.
    pub fn new(region: Region) -> Self {
        Self {
            region,
            projection: Projection::Planar,
        }
    }

    /// Set the projection applied before clipping
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Project and clip a batch.
    ///
    /// Malformed polylines are dropped and counted, never fatal. Output
    /// keeps input order; pieces of one polyline keep their direction.
    pub fn clip(&self, polylines: Vec<Polyline>) -> (Vec<Polyline>, ClipReport) {
        let mut report = ClipReport {
            input: polylines.len(),
            ..ClipReport::default()
        };
        let mut out = Vec::with_capacity(polylines.len());

        for (index, line) in polylines.into_iter().enumerate() {
            if let Some(bad) = line.find_non_finite() {
                warn!("Dropping polyline {}: non-finite point {}", index, bad);
                report.dropped_non_finite += 1;
                continue;
            }

            let line = self.projection.project(line);
            if let Some(bad) = line.find_non_finite() {
                warn!("Dropping polyline {}: projects to {}", index, bad);
                report.dropped_non_finite += 1;
                continue;
            }

            let color = line.color();
            let (runs, touches) = clip_points(line.points(), &self.region);
            if touches > 0 {
                debug!("Polyline {}: {} boundary-only contacts dropped", index, touches);
                report.dropped_degenerate += touches;
            }
            let mut pieces = 0;
            for piece in runs {
                match Polyline::new(piece) {
                    Ok(clipped) => {
                        out.push(clipped.with_color(color));
                        pieces += 1;
                    }
                    Err(_) => report.dropped_degenerate += 1,
                }
            }

            if pieces > 1 {
                debug!("Polyline {} split into {} pieces", index, pieces);
                report.split += 1;
            }
        }

        report.output = out.len();
        info!(
            "Clipped {} polylines to {}: {} non-finite, {} degenerate, {} split",
            report.input,
            report.output,
            report.dropped_non_finite,
            report.dropped_degenerate,
            report.split
        );
        (out, report)
    }
}

/// Clip planar polylines to `region`.
pub fn clip(polylines: Vec<Polyline>, region: &Region) -> Vec<Polyline> {
    Clipper::new(*region).clip(polylines).0
}

/// Split a point sequence into the runs that lie inside `region`.
///
/// A new run starts whenever a clipped segment does not begin exactly
/// where the previous one ended, i.e. on every re-entry. A segment of
/// non-zero length that meets the region in a single boundary point ends
/// the current run; when no run is open it is counted in the returned
/// number of boundary-only contacts. Zero-length input segments inside the
/// region are kept as they are.
fn clip_points(points: &[Point], region: &Region) -> (Vec<Vec<Point>>, usize) {
    let mut pieces = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut touches = 0;

    for seg in points.windows(2) {
        let visible = clip_segment(seg[0], seg[1], region)
            .filter(|(a, b)| a != b || seg[0] == seg[1]);
        match visible {
            Some((a, b)) => {
                if current.last() != Some(&a) {
                    if current.len() >= 2 {
                        pieces.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(a);
                }
                current.push(b);
            }
            None => {
                if current.len() >= 2 {
                    pieces.push(std::mem::take(&mut current));
                } else if current.is_empty() && clip_segment(seg[0], seg[1], region).is_some() {
                    touches += 1;
                }
                current.clear();
            }
        }
    }

    if current.len() >= 2 {
        pieces.push(current);
    }
    (pieces, touches)
}

/// Liang-Barsky clip of segment `a -> b` against `region`.
///
/// Returns the visible part, or `None` when the segment misses the region.
/// Ends that need no clipping are returned bit-exact.
pub(crate) fn clip_segment(a: Point, b: Point, region: &Region) -> Option<(Point, Point)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    let edges = [
        (-dx, a.x - region.min_x()),
        (dx, region.max_x() - a.x),
        (-dy, a.y - region.min_y()),
        (dy, region.max_y() - a.y),
    ];

    for (p, q) in edges {
        if p == 0.0 {
            // Parallel to this edge
            if q < 0.0 {
                return None;
            }
            continue;
        }

        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let start = if t0 == 0.0 { a } else { a.lerp(&b, t0) };
    let end = if t1 == 1.0 { b } else { a.lerp(&b, t1) };
    Some((start, end))
}
