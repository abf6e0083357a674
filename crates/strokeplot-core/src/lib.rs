//! # StrokePlot Core
//!
//! Core types and errors shared by every StrokePlot crate.
//! Provides the planar data model consumed by the geometry pipeline,
//! the device-space stroke representation produced by the serializer,
//! and the unified error type used in public APIs.

pub mod data;
pub mod error;

pub use data::{
    AxisFlip, Channels, Color, DeviceRange, Point, Polyline, Region, StrokePoint,
};

pub use error::{
    ConnectionError, Error, FileFormatError, GeometryError, LinkStateError, Result,
    TransactionError,
};
