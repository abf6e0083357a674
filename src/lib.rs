//! # StrokePlot
//!
//! Turns 2-D vector line data (rendered text strokes or geographic road
//! geometry) into a timed stroke stream for a serial pen or light plotter.
//!
//! ## Architecture
//!
//! StrokePlot is organized as a workspace with multiple crates:
//!
//! 1. **strokeplot-core** - Data model and the unified error type
//! 2. **strokeplot-geometry** - Clipper, Merger, Orderer, Serializer, text format
//! 3. **strokeplot-communication** - Serial transport and the Device Link
//! 4. **strokeplot-settings** - Configuration files
//! 5. **strokeplot** - Pipeline runner and the command line binary

pub mod pipeline;

pub use pipeline::{projection_for, run_pipeline, Pipeline, PipelineReport};

pub use strokeplot_core::{
    Color, DeviceRange, Error, Point, Polyline, Region, Result, StrokePoint,
};

pub use strokeplot_communication::{
    list_ports, ConnectionParams, DeviceCommand, DeviceLink, DeviceResponse, LinkState,
    SerialPortInfo,
};

pub use strokeplot_geometry::{load_polylines, save_polylines};

pub use strokeplot_settings::{Config, DeviceSettings, PipelineSettings, SourceKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, keeping stdout free for command output
/// - RUST_LOG environment variable support
/// - `info` by default, `debug` when `verbose` is set
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
