//! Shared value types used across the configuration, CLI, and imaging layers.
//!
//! Every enum here is serialized in kebab-case (`high-quality-bicubic`) for
//! config files and accepted case-insensitively on the command line. The
//! PascalCase spellings (`HighQualityBicubic`) are accepted as aliases so
//! existing scripts keep working.

use clap::ValueEnum;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output codec, also the set of accepted input extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpg,
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::Jpg,
        OutputFormat::Jpeg,
        OutputFormat::Png,
        OutputFormat::Gif,
        OutputFormat::Bmp,
        OutputFormat::Tiff,
    ];

    /// Lowercase extension token, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Gif => "gif",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// Match an extension case-insensitively, tolerating a leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpg | OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Gif => ImageFormat::Gif,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tiff => ImageFormat::Tiff,
        }
    }

    /// Whether an EXIF block can be embedded in files of this format.
    pub fn carries_exif(self) -> bool {
        matches!(
            self,
            OutputFormat::Jpg | OutputFormat::Jpeg | OutputFormat::Png
        )
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Anti-aliasing preference for the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SmoothingMode {
    Default,
    #[value(alias = "HighSpeed")]
    HighSpeed,
    #[default]
    #[value(alias = "HighQuality")]
    HighQuality,
    None,
    #[value(alias = "AntiAlias")]
    AntiAlias,
}

/// Resampling algorithm used when scaling the source onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMode {
    Default,
    Low,
    High,
    Bilinear,
    Bicubic,
    #[value(alias = "NearestNeighbor")]
    NearestNeighbor,
    #[value(alias = "HighQualityBilinear")]
    HighQualityBilinear,
    #[default]
    #[value(alias = "HighQualityBicubic")]
    HighQualityBicubic,
}

/// Pixel-center convention for the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PixelOffsetMode {
    Default,
    #[value(alias = "HighSpeed")]
    HighSpeed,
    #[default]
    #[value(alias = "HighQuality")]
    HighQuality,
    None,
    Half,
}

/// The three rendering knobs, grouped the way they travel through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderQuality {
    pub smoothing: SmoothingMode,
    pub interpolation: InterpolationMode,
    pub pixel_offset: PixelOffsetMode,
}
