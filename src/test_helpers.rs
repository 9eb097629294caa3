//! Shared test utilities for the simple-resize test suite.
//!
//! Synthetic images are generated in memory with the `image` crate so tests
//! never depend on checked-in binaries.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("photo.jpg");
//! let block = create_test_jpeg_with_exif(&path, 64, 48, "harbour");
//! assert_eq!(crate::imaging::exif::read_exif(&std::fs::read(&path).unwrap()), Some(block));
//! ```

use crate::imaging::exif::embed_exif;
use crate::types::OutputFormat;
use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// A smooth gradient, so resampling filters have something to work with.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

/// Encode a synthetic gradient in the given format.
pub fn encode_test_image(width: u32, height: u32, format: OutputFormat) -> Vec<u8> {
    let rgb = DynamicImage::ImageRgb8(gradient(width, height));
    let img = match format {
        OutputFormat::Gif => DynamicImage::ImageRgba8(rgb.to_rgba8()),
        _ => rgb,
    };
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format.image_format()).unwrap();
    buf.into_inner()
}

/// Write a synthetic image, picking the codec from the path's extension.
pub fn create_test_image(path: &Path, width: u32, height: u32) {
    let format = path
        .extension()
        .and_then(|e| OutputFormat::from_extension(&e.to_string_lossy()))
        .unwrap_or_default();
    std::fs::write(path, encode_test_image(width, height, format)).unwrap();
}

/// Build a minimal little-endian TIFF/EXIF block holding one ImageDescription tag.
pub fn minimal_exif(description: &str) -> Vec<u8> {
    let desc = description.as_bytes();
    let count = desc.len() as u32 + 1;

    let mut exif = Vec::new();
    exif.extend_from_slice(b"II");
    exif.extend_from_slice(&42u16.to_le_bytes());
    exif.extend_from_slice(&8u32.to_le_bytes()); // IFD0 offset

    exif.extend_from_slice(&1u16.to_le_bytes()); // entry count
    exif.extend_from_slice(&0x010Eu16.to_le_bytes()); // ImageDescription
    exif.extend_from_slice(&2u16.to_le_bytes()); // ASCII
    exif.extend_from_slice(&count.to_le_bytes());
    if count <= 4 {
        let mut inline = [0u8; 4];
        inline[..desc.len()].copy_from_slice(desc);
        exif.extend_from_slice(&inline);
    } else {
        // header (8) + count (2) + entry (12) + next IFD (4)
        exif.extend_from_slice(&26u32.to_le_bytes());
    }
    exif.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

    if count > 4 {
        exif.extend_from_slice(desc);
        exif.push(0);
    }
    exif
}

/// Write a JPEG carrying a minimal EXIF block and return that block.
pub fn create_test_jpeg_with_exif(path: &Path, width: u32, height: u32, description: &str) -> Vec<u8> {
    let block = minimal_exif(description);
    let encoded = encode_test_image(width, height, OutputFormat::Jpg);
    let tagged = embed_exif(encoded, OutputFormat::Jpg, &block).unwrap();
    std::fs::write(path, tagged).unwrap();
    block
}

/// Encode an RGB TIFF whose primary IFD carries Make and ImageDescription.
pub fn encode_tagged_tiff(width: u32, height: u32, make: &str, description: &str) -> Vec<u8> {
    use tiff::encoder::{TiffEncoder, colortype};
    use tiff::tags::Tag;

    let pixels = gradient(width, height).into_raw();
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf).unwrap();
        let mut image = encoder.new_image::<colortype::RGB8>(width, height).unwrap();
        image.encoder().write_tag(Tag::Make, make).unwrap();
        image.encoder().write_tag(Tag::ImageDescription, description).unwrap();
        image.write_data(&pixels).unwrap();
    }
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_exif_has_tiff_header() {
        let block = minimal_exif("harbour at dusk");
        assert_eq!(&block[..4], b"II*\0");
        assert!(block.ends_with(b"harbour at dusk\0"));
    }

    #[test]
    fn minimal_exif_inlines_short_values() {
        let block = minimal_exif("abc");
        assert_eq!(block.len(), 26);
        assert_eq!(&block[18..22], b"abc\0");
    }

    #[test]
    fn tagged_tiff_decodes() {
        let data = encode_tagged_tiff(5, 3, "Cam", "desc");
        let img = image::load_from_memory(&data).unwrap();
        assert_eq!((img.width(), img.height()), (5, 3));
    }

    #[test]
    fn encoded_images_sniff_as_their_format() {
        for format in OutputFormat::ALL {
            let data = encode_test_image(6, 4, format);
            assert_eq!(image::guess_format(&data).unwrap(), format.image_format());
        }
    }
}
