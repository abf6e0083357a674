//! StrokePlot job configuration
//!
//! One file describes how to reach the plotter (`[connection]`), how to cut
//! and arrange the input (`[pipeline]`) and how strokes map onto the device
//! (`[device]`). Missing keys take their defaults, so a file only needs the
//! values that differ. The file extension picks the format: `.toml` or
//! `.json`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strokeplot_communication::ConnectionParams;
use strokeplot_core::{AxisFlip, DeviceRange, Error, Point, Region, Result};
use strokeplot_geometry::MIN_INTERPOLATION_STEP;

/// Coordinate convention of the input polylines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Already planar (rendered text strokes)
    #[default]
    Planar,
    /// Longitude in x, latitude in y
    Geographic,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planar => write!(f, "planar"),
            Self::Geographic => write!(f, "geographic"),
        }
    }
}

/// Geometry pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Input coordinate convention
    pub source: SourceKind,
    /// Reference latitude for geographic input (degrees)
    pub origin_lat: f64,
    /// Reference longitude for geographic input (degrees)
    pub origin_lon: f64,
    /// Region center X in projected units
    pub region_center_x: f64,
    /// Region center Y in projected units
    pub region_center_y: f64,
    /// Region half-extent in projected units
    pub region_half_extent: f64,
    /// Endpoint distance treated as the same point when merging
    pub merge_tolerance: f64,
    /// Run the line merger
    pub merge: bool,
    /// Run the path orderer
    pub order: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            source: SourceKind::Planar,
            origin_lat: 0.0,
            origin_lon: 0.0,
            region_center_x: 0.0,
            region_center_y: 0.0,
            region_half_extent: 1.0,
            merge_tolerance: 0.001,
            merge: true,
            order: true,
        }
    }
}

impl PipelineSettings {
    /// The clipping region.
    pub fn region(&self) -> Result<Region> {
        Ok(Region::new(
            Point::new(self.region_center_x, self.region_center_y),
            self.region_half_extent,
        )?)
    }
}

/// Target device settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Lowest addressable coordinate
    pub range_min: i32,
    /// Highest addressable coordinate
    pub range_max: i32,
    /// Mirrored axis
    pub flip: AxisFlip,
    /// Delay units per unit of normalized distance
    pub time_scale: f64,
    /// Delay of the first pen-up point
    pub settle_delay: u32,
    /// Longest drawing step in normalized units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpolation_step: Option<f64>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            range_min: 0,
            range_max: 255,
            flip: AxisFlip::Y,
            time_scale: 5000.0,
            settle_delay: 0,
            interpolation_step: None,
        }
    }
}

impl DeviceSettings {
    /// The device coordinate range.
    pub fn device_range(&self) -> Result<DeviceRange> {
        Ok(DeviceRange::new(self.range_min, self.range_max, self.flip)?)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Serial connection
    pub connection: ConnectionParams,
    /// Geometry pipeline
    pub pipeline: PipelineSettings,
    /// Target device
    pub device: DeviceSettings,
}

impl Config {
    /// Default job: planar input in the unit square, 8-bit device.
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/strokeplot/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("strokeplot").join("config.toml"))
    }

    /// Load `path`, else the default file if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => {
                tracing::debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read, parse and validate a `.toml` or `.json` job configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let format = FileFormat::of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::other(format!("Cannot read config {}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            FileFormat::Json => serde_json::from_str(&content)
                .map_err(|e| Error::other(format!("Bad JSON in {}: {}", path.display(), e)))?,
            FileFormat::Toml => toml::from_str(&content)
                .map_err(|e| Error::other(format!("Bad TOML in {}: {}", path.display(), e)))?,
        };

        config.validate()?;
        tracing::debug!("Loaded {} config from {}", format, path.display());
        Ok(config)
    }

    /// Write this configuration to `path`, creating parent directories.
    ///
    /// An invalid configuration is refused before anything touches disk.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let format = FileFormat::of(path)?;

        let content = match format {
            FileFormat::Json => serde_json::to_string_pretty(self).map_err(|e| e.to_string()),
            FileFormat::Toml => toml::to_string_pretty(self).map_err(|e| e.to_string()),
        }
        .map_err(|e| Error::other(format!("Cannot encode {} config: {}", format, e)))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content).map_err(|e| {
            Error::other(format!("Cannot write config {}: {}", path.display(), e))
        })?;
        tracing::debug!("Saved {} config to {}", format, path.display());
        Ok(())
    }

    /// Check every section; the first problem found is returned.
    pub fn validate(&self) -> Result<()> {
        self.connection.validate()?;

        let pipeline = &self.pipeline;
        if !pipeline.region_half_extent.is_finite() || pipeline.region_half_extent <= 0.0 {
            return Err(Error::other("Region half extent must be > 0"));
        }
        if !pipeline.region_center_x.is_finite() || !pipeline.region_center_y.is_finite() {
            return Err(Error::other("Region center must be finite"));
        }
        if !pipeline.merge_tolerance.is_finite() || pipeline.merge_tolerance < 0.0 {
            return Err(Error::other("Merge tolerance must be >= 0"));
        }
        if pipeline.source == SourceKind::Geographic
            && (!(-90.0..=90.0).contains(&pipeline.origin_lat)
                || !(-180.0..=180.0).contains(&pipeline.origin_lon))
        {
            return Err(Error::other("Geographic origin out of range"));
        }

        let device = &self.device;
        if device.range_min >= device.range_max {
            return Err(Error::other("Device range_min must be < range_max"));
        }
        if !device.time_scale.is_finite() || device.time_scale <= 0.0 {
            return Err(Error::other("Time scale must be > 0"));
        }
        if let Some(step) = device.interpolation_step {
            if !step.is_finite() || step < MIN_INTERPOLATION_STEP {
                return Err(Error::other(format!(
                    "Interpolation step must be >= {}, got {}",
                    MIN_INTERPOLATION_STEP, step
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(Error::other(format!(
                "Config file {} must end in .toml or .json",
                path.display()
            ))),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::Toml => write!(f, "TOML"),
        }
    }
}
