//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Encoded, ImageBackend};
use super::calculations::calculate_target_dimensions;
use super::params::{Bounds, Quality, ResizeParams};
use crate::types::{OutputFormat, RenderQuality};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Everything about a render except where the result goes.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub format: OutputFormat,
    pub quality: Quality,
    pub bounds: Bounds,
    pub preserve_ratio: bool,
    pub preserve_metadata: bool,
    pub render: RenderQuality,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: Quality::default(),
            bounds: Bounds::default(),
            preserve_ratio: true,
            preserve_metadata: true,
            render: RenderQuality::default(),
        }
    }
}

/// A rendered image held in memory, ready to be written.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub original: (u32, u32),
    pub width: u32,
    pub height: u32,
    pub encoded: Encoded,
}

/// Plan a resize operation without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_resize(
    source: &Path,
    original_dims: (u32, u32),
    exif: Option<Vec<u8>>,
    settings: &RenderSettings,
) -> ResizeParams {
    let (width, height) =
        calculate_target_dimensions(original_dims, settings.bounds, settings.preserve_ratio);

    ResizeParams {
        source: source.to_path_buf(),
        width,
        height,
        format: settings.format,
        quality: settings.quality,
        render: settings.render,
        exif: if settings.preserve_metadata { exif } else { None },
    }
}

/// Identify, size, and render one image.
///
/// The EXIF block is only read when metadata preservation is on.
pub fn render_image(
    backend: &impl ImageBackend,
    source: &Path,
    settings: &RenderSettings,
) -> Result<RenderedImage> {
    let original = get_dimensions(backend, source)?;
    let exif = if settings.preserve_metadata {
        backend.read_exif(source)?
    } else {
        None
    };

    let params = plan_resize(source, original, exif, settings);
    let encoded = backend.resize(&params)?;

    Ok(RenderedImage {
        original,
        width: params.width,
        height: params.height,
        encoded,
    })
}
