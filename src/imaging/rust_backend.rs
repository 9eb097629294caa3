//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions`, codec sniffed from content (header only) |
//! | Decode (JPEG, PNG, GIF, BMP, TIFF) | `image::ImageReader` |
//! | Resize | `image::DynamicImage::resize_exact`, filter chosen by [`InterpolationMode`] |
//! | Encode | `JpegEncoder` (with quality) or `DynamicImage::write_to` |
//! | EXIF | [`super::exif`] via `img-parts` |
//!
//! ## Rendering knobs
//!
//! Only the interpolation mode changes pixels: it selects the resampling
//! filter. Smoothing and pixel-offset modes describe vector drawing and
//! sample-grid conventions that `image`'s resamplers fix internally (pixel
//! centers, no shape anti-aliasing), so they are accepted and logged but have
//! no further effect.

use super::backend::{BackendError, Dimensions, Encoded, ImageBackend, MetadataTransfer};
use super::exif;
use super::params::ResizeParams;
use crate::types::{InterpolationMode, OutputFormat};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    _probed: (),
}

impl RustBackend {
    /// Verify every codec the tool promises is compiled in, then hand out a backend.
    ///
    /// This is the only constructor: a caller that holds a `RustBackend` knows
    /// the environment check passed, so no global "ready" flag is needed.
    pub fn initialize() -> Result<Self, BackendError> {
        let missing: Vec<String> = OutputFormat::ALL
            .into_iter()
            .filter(|f| {
                let fmt = f.image_format();
                !fmt.reading_enabled() || !fmt.writing_enabled()
            })
            .map(|f| f.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(BackendError::EnvironmentUnavailable(format!(
                "codecs not compiled in: {}",
                missing.join(", ")
            )));
        }
        log::debug!("imaging environment ready: all codecs available");
        Ok(Self { _probed: () })
    }
}

/// Map an interpolation mode to the closest resampling filter.
pub fn filter_for(mode: InterpolationMode) -> FilterType {
    match mode {
        InterpolationMode::NearestNeighbor => FilterType::Nearest,
        InterpolationMode::Default
        | InterpolationMode::Low
        | InterpolationMode::Bilinear
        | InterpolationMode::HighQualityBilinear => FilterType::Triangle,
        InterpolationMode::Bicubic => FilterType::CatmullRom,
        InterpolationMode::High | InterpolationMode::HighQualityBicubic => FilterType::Lanczos3,
    }
}

/// Load and decode an image from disk, sniffing the codec from content.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Convert to a pixel layout the target codec can store.
fn prepare_for_encoding(img: DynamicImage, format: OutputFormat) -> DynamicImage {
    let has_alpha = img.color().has_alpha();
    match format {
        // JPEG has no alpha channel and only 8-bit samples
        OutputFormat::Jpg | OutputFormat::Jpeg => match img {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => img,
            other => DynamicImage::ImageRgb8(other.into_rgb8()),
        },
        OutputFormat::Gif => DynamicImage::ImageRgba8(img.into_rgba8()),
        OutputFormat::Bmp => match img {
            DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_)
            | DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_) => img,
            other if has_alpha => DynamicImage::ImageRgba8(other.into_rgba8()),
            other => DynamicImage::ImageRgb8(other.into_rgb8()),
        },
        OutputFormat::Png => match img {
            DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(img.into_rgb16()),
            DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(img.into_rgba16()),
            other => other,
        },
        // The TIFF encoder has no grey+alpha layout
        OutputFormat::Tiff => match img {
            DynamicImage::ImageLumaA8(_) => DynamicImage::ImageRgba8(img.into_rgba8()),
            DynamicImage::ImageLumaA16(_) => DynamicImage::ImageRgba16(img.into_rgba16()),
            DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(img.into_rgb16()),
            DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(img.into_rgba16()),
            other => other,
        },
    }
}

/// Encode a DynamicImage into memory with the codec for `format`.
fn encode_image(img: &DynamicImage, format: OutputFormat, quality: u32) -> Result<Vec<u8>, BackendError> {
    let mut buf = Cursor::new(Vec::new());
    let written = match format {
        OutputFormat::Jpg | OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality as u8);
            img.write_with_encoder(encoder)
        }
        other => img.write_to(&mut buf, other.image_format()),
    };
    written.map_err(|e| BackendError::ProcessingFailed(format!("{format} encode failed: {e}")))?;
    Ok(buf.into_inner())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        // Sniff from content like `load_image`, so a mislabelled file identifies
        let (width, height) = ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
            })?;
        Ok(Dimensions { width, height })
    }

    fn read_exif(&self, path: &Path) -> Result<Option<Vec<u8>>, BackendError> {
        let data = std::fs::read(path)?;
        Ok(exif::read_exif(&data))
    }

    fn resize(&self, params: &ResizeParams) -> Result<Encoded, BackendError> {
        let img = load_image(&params.source)?;
        log::debug!(
            "render {} → {}x{} ({:?}, smoothing {:?}, pixel offset {:?})",
            params.source.display(),
            params.width,
            params.height,
            params.render.interpolation,
            params.render.smoothing,
            params.render.pixel_offset,
        );

        let rendered = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            img.resize_exact(
                params.width,
                params.height,
                filter_for(params.render.interpolation),
            )
        };

        let prepared = prepare_for_encoding(rendered, params.format);
        let bytes = encode_image(&prepared, params.format, params.quality.value())?;

        match &params.exif {
            None => Ok(Encoded {
                bytes,
                metadata: MetadataTransfer::Absent,
            }),
            Some(_) if !params.format.carries_exif() => Ok(Encoded {
                bytes,
                metadata: MetadataTransfer::Unsupported,
            }),
            Some(block) => Ok(Encoded {
                bytes: exif::embed_exif(bytes, params.format, block)?,
                metadata: MetadataTransfer::Copied,
            }),
        }
    }
}
