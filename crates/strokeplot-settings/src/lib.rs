//! StrokePlot Settings Crate
//!
//! Handles configuration files: the serial connection, the geometry
//! pipeline and the target device.

pub mod config;

pub use config::{Config, DeviceSettings, PipelineSettings, SourceKind};
pub use strokeplot_communication::{ConnectionParams, SerialParity};
