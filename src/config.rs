//! Resize configuration.
//!
//! Settings are layered: stock defaults, then an optional config file, then
//! command-line flags. Each layer is a sparse TOML table merged over the one
//! before it, and the result is deserialized and validated once.
//!
//! ```text
//! stock defaults  →  --config resize.toml  →  CLI flags  →  ResizeConfig
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! format = "jpg"            # jpg, jpeg, png, gif, bmp, tiff
//! quality = 90              # JPEG quality (1-100)
//!
//! [resize]
//! # max_width = 1920        # Bounding width (omit for no bound)
//! # max_height = 1080       # Bounding height (omit for no bound)
//! preserve_ratio = true     # false stretches to the exact bounds
//!
//! [metadata]
//! preserve_exif = true      # Copy the source EXIF block into the output
//!
//! [render]
//! smoothing = "high-quality"
//! interpolation = "high-quality-bicubic"
//! pixel_offset = "high-quality"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Bounds, Quality, RenderSettings};
use crate::types::{InterpolationMode, OutputFormat, PixelOffsetMode, RenderQuality, SmoothingMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Output codec and encoder quality.
    pub output: OutputConfig,
    /// Bounding box and aspect handling.
    pub resize: ResizeSection,
    /// EXIF handling.
    pub metadata: MetadataConfig,
    /// Rendering quality knobs.
    pub render: RenderQuality,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ResizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.resize.max_width == Some(0) || self.resize.max_height == Some(0) {
            return Err(ConfigError::Validation(
                "resize.max_width and resize.max_height must be at least 1".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The subset of settings the imaging layer needs per file.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            format: self.output.format,
            quality: Quality::new(self.output.quality),
            bounds: Bounds::new(self.resize.max_width, self.resize.max_height),
            preserve_ratio: self.resize.preserve_ratio,
            preserve_metadata: self.metadata.preserve_exif,
            render: self.render,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// JPEG encoding quality (1 = worst, 100 = best). Ignored by lossless codecs.
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: Quality::default().value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeSection {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// Fit within the bounds (`true`) or stretch to them exactly (`false`).
    pub preserve_ratio: bool,
}

impl Default for ResizeSection {
    fn default() -> Self {
        Self {
            max_width: None,
            max_height: None,
            preserve_ratio: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    pub preserve_exif: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            preserve_exif: true,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Command-line overrides
// =============================================================================

/// Values given on the command line. `None` / `false` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub format: Option<OutputFormat>,
    pub quality: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub disable_ratio: bool,
    pub disable_exif: bool,
    pub smoothing: Option<SmoothingMode>,
    pub interpolation: Option<InterpolationMode>,
    pub pixel_offset: Option<PixelOffsetMode>,
    pub max_processes: Option<usize>,
}

fn set(
    root: &mut toml::Table,
    section: &str,
    key: &str,
    value: impl Serialize,
) -> Result<(), ConfigError> {
    let value = toml::Value::try_from(value)?;
    let entry = root
        .entry(section)
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    if let toml::Value::Table(table) = entry {
        table.insert(key.to_string(), value);
    }
    Ok(())
}

impl Overrides {
    /// Render the flags that were actually given as a sparse TOML overlay.
    pub fn to_toml(&self) -> Result<toml::Value, ConfigError> {
        let mut root = toml::Table::new();
        if let Some(format) = self.format {
            set(&mut root, "output", "format", format)?;
        }
        if let Some(quality) = self.quality {
            set(&mut root, "output", "quality", quality)?;
        }
        if let Some(w) = self.max_width {
            set(&mut root, "resize", "max_width", w)?;
        }
        if let Some(h) = self.max_height {
            set(&mut root, "resize", "max_height", h)?;
        }
        if self.disable_ratio {
            set(&mut root, "resize", "preserve_ratio", false)?;
        }
        if self.disable_exif {
            set(&mut root, "metadata", "preserve_exif", false)?;
        }
        if let Some(mode) = self.smoothing {
            set(&mut root, "render", "smoothing", mode)?;
        }
        if let Some(mode) = self.interpolation {
            set(&mut root, "render", "interpolation", mode)?;
        }
        if let Some(mode) = self.pixel_offset {
            set(&mut root, "render", "pixel_offset", mode)?;
        }
        if let Some(n) = self.max_processes {
            let n = i64::try_from(n).map_err(|_| {
                ConfigError::Validation(format!("--jobs {n} is out of range"))
            })?;
            set(&mut root, "processing", "max_processes", n)?;
        }
        Ok(toml::Value::Table(root))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ResizeConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// The file was named explicitly, so a missing file is an error.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<ResizeConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: ResizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Build the effective config: stock defaults, then `file`, then `overrides`.
pub fn load_config(file: Option<&Path>, overrides: &Overrides) -> Result<ResizeConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let mut layers = Vec::with_capacity(2);
    if let Some(path) = file {
        log::debug!("loading config from {}", path.display());
        layers.push(load_raw_config(path)?);
    }
    layers.push(overrides.to_toml()?);
    resolve_config(base, layers)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Resize Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass the file with --config. Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Output codec: jpg, jpeg, png, gif, bmp, tiff.
# The output file extension always follows this setting.
format = "jpg"

# JPEG encoding quality (1 = worst, 100 = best). Lossless formats ignore it.
quality = 90

# ---------------------------------------------------------------------------
# Resizing
# ---------------------------------------------------------------------------
[resize]
# Bounding box in pixels. Omit a side to leave it unconstrained.
# max_width = 1920
# max_height = 1080

# true: fit within the bounds, keeping the aspect ratio.
# false: stretch to exactly max_width x max_height.
preserve_ratio = true

# ---------------------------------------------------------------------------
# Metadata
# ---------------------------------------------------------------------------
[metadata]
# Copy the source EXIF block into JPEG and PNG outputs.
# GIF, BMP and TIFF outputs are written without it.
preserve_exif = true

# ---------------------------------------------------------------------------
# Rendering quality
# ---------------------------------------------------------------------------
[render]
# default, high-speed, high-quality, none, anti-alias
smoothing = "high-quality"

# default, low, high, bilinear, bicubic, nearest-neighbor,
# high-quality-bilinear, high-quality-bicubic
interpolation = "high-quality-bicubic"

# default, high-speed, high-quality, none, half
pixel_offset = "high-quality"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
