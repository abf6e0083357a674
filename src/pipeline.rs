//! Pipeline runner
//!
//! Chains the geometry stages for one drawing job:
//!
//! ```text
//! project + clip -> merge -> order -> normalize -> serialize
//! ```
//!
//! Merge and order can be switched off in the configuration. Every run gets
//! a job id that is recorded on a tracing span around all stage logs.

use strokeplot_core::{Polyline, Region, Result, StrokePoint};
use strokeplot_geometry::{
    normalize, ClipReport, Clipper, GeoPoint, LineMerger, MergeReport, OrderReport, PathOrderer,
    Projection, SerializeReport, SerializerOptions, StrokeSerializer,
};
use strokeplot_settings::{Config, PipelineSettings, SourceKind};
use tracing::{info, info_span, Span};
use uuid::Uuid;

/// What each stage of one job did
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub job_id: Uuid,
    pub clip: ClipReport,
    /// `None` when merging is disabled
    pub merge: Option<MergeReport>,
    /// `None` when ordering is disabled
    pub order: Option<OrderReport>,
    /// `None` until the job is serialized
    pub serialize: Option<SerializeReport>,
}

impl PipelineReport {
    fn new(job_id: Uuid) -> Self {
        Self {
            job_id,
            clip: ClipReport::default(),
            merge: None,
            order: None,
            serialize: None,
        }
    }
}

/// Map the configured source frame to a projection.
pub fn projection_for(settings: &PipelineSettings) -> Projection {
    match settings.source {
        SourceKind::Planar => Projection::Planar,
        SourceKind::Geographic => Projection::Geographic {
            origin: GeoPoint::new(settings.origin_lat, settings.origin_lon),
        },
    }
}

/// A configured set of stages for one job
#[derive(Debug)]
pub struct Pipeline {
    job_id: Uuid,
    span: Span,
    region: Region,
    clipper: Clipper,
    merger: Option<LineMerger>,
    order: bool,
    serializer: StrokeSerializer,
}

impl Pipeline {
    /// Build the stages from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let region = config.pipeline.region()?;
        let clipper = Clipper::new(region).with_projection(projection_for(&config.pipeline));
        let merger = if config.pipeline.merge {
            Some(LineMerger::new(config.pipeline.merge_tolerance)?)
        } else {
            None
        };
        let serializer = StrokeSerializer::new(SerializerOptions {
            range: config.device.device_range()?,
            time_scale: config.device.time_scale,
            settle_delay: config.device.settle_delay,
            interpolation_step: config.device.interpolation_step,
        })?;

        let job_id = Uuid::new_v4();
        Ok(Self {
            job_id,
            span: info_span!("job", id = %job_id),
            region,
            clipper,
            merger,
            order: config.pipeline.order,
            serializer,
        })
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// The span stage logs are recorded on; enter it around device work
    /// belonging to the same job.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Run the geometry stages and return normalized polylines.
    pub fn prepare(&self, polylines: Vec<Polyline>) -> (Vec<Polyline>, PipelineReport) {
        let _enter = self.span.enter();
        let mut report = PipelineReport::new(self.job_id);

        let (mut lines, clip) = self.clipper.clip(polylines);
        report.clip = clip;

        if let Some(merger) = &self.merger {
            let (merged, merge) = merger.merge(lines);
            lines = merged;
            report.merge = Some(merge);
        }

        if self.order {
            let (ordered, order) = PathOrderer::order(lines);
            lines = ordered;
            report.order = Some(order);
        }

        (normalize(lines, &self.region), report)
    }

    /// Run every stage and produce the stroke stream.
    pub fn run(&self, polylines: Vec<Polyline>) -> (Vec<StrokePoint>, PipelineReport) {
        let (lines, mut report) = self.prepare(polylines);

        let _enter = self.span.enter();
        let (points, serialize) = self.serializer.serialize(&lines);
        report.serialize = Some(serialize);

        info!(
            "Job finished: {} input polylines, {} drawn, {} stroke points",
            report.clip.input,
            lines.len(),
            points.len()
        );
        (points, report)
    }
}

/// Turn raw polylines into a stroke stream using `config`.
pub fn run_pipeline(
    polylines: Vec<Polyline>,
    config: &Config,
) -> Result<(Vec<StrokePoint>, PipelineReport)> {
    Ok(Pipeline::from_config(config)?.run(polylines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strokeplot_geometry::{load_polylines, save_polylines};
    use tempfile::TempDir;

    fn line(coords: &[(f64, f64)]) -> Polyline {
        Polyline::from_coords(coords).unwrap()
    }

    /// Two fragments sharing the origin, one line outside, one crossing out.
    fn sample() -> Vec<Polyline> {
        vec![
            line(&[(-0.5, 0.0), (0.0, 0.0)]),
            line(&[(0.5, 0.0), (0.0, 0.0)]),
            line(&[(2.0, 2.0), (3.0, 3.0)]),
            line(&[(0.5, 0.5), (1.5, 0.5)]),
        ]
    }

    #[test]
    fn test_projection_for_source() {
        let mut settings = PipelineSettings::default();
        assert_eq!(projection_for(&settings), Projection::Planar);

        settings.source = SourceKind::Geographic;
        settings.origin_lat = 52.5;
        settings.origin_lon = 13.4;
        assert_eq!(
            projection_for(&settings),
            Projection::Geographic {
                origin: GeoPoint::new(52.5, 13.4)
            }
        );
    }

    #[test]
    fn test_full_pipeline_reports() {
        let (points, report) = run_pipeline(sample(), &Config::new()).unwrap();

        assert_eq!(report.clip.input, 4);
        assert_eq!(report.clip.output, 3);

        let merge = report.merge.unwrap();
        assert_eq!(merge.merges, 1);
        assert_eq!(merge.output, 2);

        let order = report.order.unwrap();
        assert_eq!(order.count, 2);
        assert_eq!(order.reversed, 0);

        // travel, 2 draws | jump, landing, 1 draw
        let serialize = report.serialize.unwrap();
        assert_eq!(points.len(), 6);
        assert_eq!(serialize.points, 6);
        assert_eq!(serialize.jumps, 1);
        assert_eq!(serialize.pen_down, 4);
        assert_eq!(serialize.total_delay, 10_000);

        assert!(!points[0].pen);
        assert!(!points[3].pen);
        assert!(points.iter().all(|p| (0..=255).contains(&p.x) && (0..=255).contains(&p.y)));
    }

    #[test]
    fn test_disabled_stages_have_no_report() {
        let mut config = Config::new();
        config.pipeline.merge = false;
        config.pipeline.order = false;

        let (points, report) = run_pipeline(sample(), &config).unwrap();
        assert!(report.merge.is_none());
        assert!(report.order.is_none());
        assert_eq!(report.clip.output, 3);
        // Three separate polylines: two jumps
        assert_eq!(report.serialize.unwrap().jumps, 2);
        assert_eq!(points.len(), 8);
    }

    #[test]
    fn test_geographic_job_is_normalized() {
        let mut config = Config::new();
        config.pipeline.source = SourceKind::Geographic;
        config.pipeline.region_half_extent = 1000.0;

        let roads = vec![
            line(&[(-0.001, 0.0), (0.001, 0.0)]),
            line(&[(0.5, 0.5), (0.6, 0.6)]),
        ];
        let pipeline = Pipeline::from_config(&config).unwrap();
        let (prepared, report) = pipeline.prepare(roads);

        assert_eq!(report.clip.output, 1);
        assert!(report.serialize.is_none());
        let points = prepared[0].points();
        assert!((points[0].x + 0.11132).abs() < 1e-9);
        assert!((points[1].x - 0.11132).abs() < 1e-9);
        assert_eq!(points[0].y, 0.0);
    }

    #[test]
    fn test_prepared_file_feeds_serializer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prepared.txt");

        let mut config = Config::new();
        let pipeline = Pipeline::from_config(&config).unwrap();
        let (prepared, _) = pipeline.prepare(sample());
        save_polylines(&path, &prepared).unwrap();

        // Prepared data is already normalized and ordered
        config.pipeline.merge = false;
        config.pipeline.order = false;
        let reloaded = load_polylines(&path).unwrap();
        let (from_file, _) = run_pipeline(reloaded, &config).unwrap();
        let (direct, _) = run_pipeline(sample(), &Config::new()).unwrap();
        assert_eq!(from_file, direct);
    }

    #[test]
    fn test_empty_job() {
        let (points, report) = run_pipeline(Vec::new(), &Config::new()).unwrap();
        assert!(points.is_empty());
        assert_eq!(report.serialize.unwrap().points, 0);
    }

    #[test]
    fn test_each_pipeline_gets_a_job_id() {
        let config = Config::new();
        let a = Pipeline::from_config(&config).unwrap();
        let b = Pipeline::from_config(&config).unwrap();
        assert_ne!(a.job_id(), b.job_id());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::new();
        config.pipeline.merge_tolerance = -1.0;
        assert!(run_pipeline(Vec::new(), &config).is_err());
    }
}
