//! # StrokePlot Geometry
//!
//! The geometry-to-stroke stages of the pipeline, leaves first:
//!
//! - [`projection`]: geographic to local planar frame, normalization
//! - [`clipper`]: Liang-Barsky clipping against a square [`Region`]
//! - [`merger`]: fusing fragments that share endpoints
//! - [`orderer`]: greedy pen-up travel reduction
//! - [`serializer`]: timed, quantized [`StrokePoint`] stream
//! - [`polyline_file`]: the plain-text intermediate format
//!
//! Every stage takes ownership of its input and returns a new collection
//! together with a report of what it dropped or transformed.
//!
//! [`Region`]: strokeplot_core::Region
//! [`StrokePoint`]: strokeplot_core::StrokePoint

pub mod clipper;
pub mod merger;
pub mod orderer;
pub mod polyline_file;
pub mod projection;
pub mod serializer;

pub use clipper::{clip, ClipReport, Clipper};
pub use merger::{merge, LineMerger, MergeReport};
pub use orderer::{order, pen_up_travel, OrderReport, PathOrderer};
pub use polyline_file::{load_polylines, read_polylines, save_polylines, write_polylines};
pub use projection::{meters_to_degrees, normalize, GeoPoint, Projection, METERS_PER_DEGREE};
pub use serializer::{
    serialize, SerializeReport, SerializerOptions, StrokeSerializer, MIN_INTERPOLATION_STEP,
};
