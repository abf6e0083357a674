//! Stroke Serializer
//!
//! Flattens ordered, normalized polylines into the timed point stream a
//! device executes. Each point carries a delay proportional to the
//! distance travelled from the previous point, measured in the logical
//! [-1, +1] frame, and a pen flag. Quantization into the device range
//! happens here and nowhere else.

use strokeplot_core::{Channels, Color, DeviceRange, GeometryError, Point, Polyline, StrokePoint};
use tracing::info;

/// Finest accepted interpolation step in logical units. Already below one
/// step of an 8-bit device.
pub const MIN_INTERPOLATION_STEP: f64 = 1e-3;

/// Serializer parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SerializerOptions {
    /// Device coordinate range and axis flip
    pub range: DeviceRange,
    /// Delay units per unit of logical distance
    pub time_scale: f64,
    /// Delay of the initial pen-up point
    pub settle_delay: u32,
    /// Longest drawing step in logical units; longer segments are subdivided
    pub interpolation_step: Option<f64>,
}

impl SerializerOptions {
    pub fn new(range: DeviceRange, time_scale: f64) -> Self {
        Self {
            range,
            time_scale,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !self.time_scale.is_finite() || self.time_scale <= 0.0 {
            return Err(GeometryError::InvalidParameter {
                name: "time_scale".to_string(),
                reason: format!("must be finite and > 0, got {}", self.time_scale),
            });
        }
        if let Some(step) = self.interpolation_step {
            if !step.is_finite() || step < MIN_INTERPOLATION_STEP {
                return Err(GeometryError::InvalidParameter {
                    name: "interpolation_step".to_string(),
                    reason: format!(
                        "must be finite and >= {}, got {}",
                        MIN_INTERPOLATION_STEP, step
                    ),
                });
            }
        }
        Ok(())
    }
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            range: DeviceRange::dac8(),
            time_scale: 5000.0,
            settle_delay: 0,
            interpolation_step: None,
        }
    }
}

/// What the serializer emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeReport {
    /// Stroke points emitted
    pub points: usize,
    /// Pen-up jumps between polylines, excluding the initial point
    pub jumps: usize,
    /// Pen-down points emitted
    pub pen_down: usize,
    /// Sum of all delays
    pub total_delay: u64,
}

/// Turns polylines into a [`StrokePoint`] stream
#[derive(Debug, Clone, Copy)]
pub struct StrokeSerializer {
    options: SerializerOptions,
}

impl StrokeSerializer {
    pub fn new(options: SerializerOptions) -> Result<Self, GeometryError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    /// Serialize polylines in the given order.
    ///
    /// The stream opens with one pen-up point at the first vertex. A
    /// polyline starting exactly where the previous one ended continues
    /// pen-down; otherwise a pen-up jump to its start is emitted, followed
    /// by a zero-delay pen-down point at the same spot.
    pub fn serialize(&self, polylines: &[Polyline]) -> (Vec<StrokePoint>, SerializeReport) {
        let mut out = Vec::new();
        let mut report = SerializeReport::default();
        let mut pen: Option<Point> = None;

        for line in polylines {
            let channels = line.color().unwrap_or(Color::RED).channels();
            let start = line.start();

            match pen {
                None => {
                    out.push(self.travel(start, self.options.settle_delay));
                }
                Some(last) if last == start => {}
                Some(last) => {
                    out.push(self.travel(start, self.delay_for(last.distance_to(&start))));
                    out.push(self.draw(start, 0, channels));
                    report.jumps += 1;
                }
            }

            let mut prev = start;
            for &p in &line.points()[1..] {
                self.push_segment(&mut out, prev, p, channels);
                prev = p;
            }
            pen = Some(prev);
        }

        report.points = out.len();
        report.pen_down = out.iter().filter(|p| p.pen).count();
        report.total_delay = out.iter().map(|p| u64::from(p.delay)).sum();
        info!(
            "Serialized {} polylines into {} points ({} pen-down, {} jumps, total delay {})",
            polylines.len(),
            report.points,
            report.pen_down,
            report.jumps,
            report.total_delay
        );
        (out, report)
    }

    fn push_segment(
        &self,
        out: &mut Vec<StrokePoint>,
        from: Point,
        to: Point,
        channels: Channels,
    ) {
        let distance = from.distance_to(&to);
        let steps = match self.options.interpolation_step {
            Some(step) if distance > step => (distance / step).ceil() as usize,
            _ => 1,
        };

        let step_delay = self.delay_for(distance / steps as f64);
        for k in 1..steps {
            let t = k as f64 / steps as f64;
            out.push(self.draw(from.lerp(&to, t), step_delay, channels));
        }
        // Last sub-step lands exactly on the vertex
        out.push(self.draw(to, step_delay, channels));
    }

    fn delay_for(&self, distance: f64) -> u32 {
        // `as` saturates at u32::MAX and maps NaN to 0
        (self.options.time_scale * distance).round() as u32
    }

    fn travel(&self, p: Point, delay: u32) -> StrokePoint {
        let (x, y) = self.options.range.quantize(p);
        StrokePoint::travel(x, y, delay)
    }

    fn draw(&self, p: Point, delay: u32, channels: Channels) -> StrokePoint {
        let (x, y) = self.options.range.quantize(p);
        StrokePoint::draw(x, y, delay, channels)
    }
}

/// Serialize with default settle delay and no interpolation.
///
/// A non-positive `time_scale` yields all-zero delays.
pub fn serialize(polylines: &[Polyline], range: DeviceRange, time_scale: f64) -> Vec<StrokePoint> {
    let options = SerializerOptions::new(range, time_scale);
    StrokeSerializer { options }.serialize(polylines).0
}
