//! EXIF block extraction and embedding.
//!
//! The block is treated as an opaque TIFF-structured byte string: every tag in
//! it is carried verbatim, nothing is parsed or rewritten. Container handling
//! uses `img-parts`:
//!
//! | Container | Location |
//! |---|---|
//! | JPEG | APP1 segment (`Exif\0\0` prefix handled by `img-parts`) |
//! | PNG | `eXIf` chunk |
//! | TIFF (read only) | IFD0 plus its Exif/GPS sub-IFDs, re-serialised with `kamadak-exif` |
//!
//! GIF and BMP have no EXIF container. A TIFF file *is* the tag structure, so
//! its block is rebuilt from the primary IFD minus the tags that describe the
//! pixel layout. The `image` crate's TIFF encoder does not expose custom tags,
//! so TIFF targets are treated as non-carriers.

use super::backend::BackendError;
use crate::types::OutputFormat;
use image::ImageFormat;
use img_parts::ImageEXIF;
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use std::io::Cursor;

/// Extract the EXIF block from encoded image bytes.
///
/// Formats without a readable EXIF container, or files that fail to parse as
/// their sniffed container, yield `None`.
pub fn read_exif(data: &[u8]) -> Option<Vec<u8>> {
    let format = image::guess_format(data).ok()?;
    let exif = match format {
        ImageFormat::Jpeg => Jpeg::from_bytes(data.to_vec().into()).ok()?.exif(),
        ImageFormat::Png => Png::from_bytes(data.to_vec().into()).ok()?.exif(),
        ImageFormat::Tiff => return read_tiff_exif(data),
        _ => None,
    };
    exif.map(|e| e.to_vec()).filter(|e| !e.is_empty())
}

/// Tags that describe how a TIFF file stores its own pixels. They are wrong
/// for any re-encoded output, so they never go into a carried block.
const TIFF_LAYOUT_TAGS: &[u16] = &[
    0x00FE, // NewSubfileType
    0x00FF, // SubfileType
    0x0100, // ImageWidth
    0x0101, // ImageLength
    0x0102, // BitsPerSample
    0x0103, // Compression
    0x0106, // PhotometricInterpretation
    0x010A, // FillOrder
    0x0111, // StripOffsets
    0x0115, // SamplesPerPixel
    0x0116, // RowsPerStrip
    0x0117, // StripByteCounts
    0x011C, // PlanarConfiguration
    0x013D, // Predictor
    0x0140, // ColorMap
    0x0142, // TileWidth
    0x0143, // TileLength
    0x0144, // TileOffsets
    0x0145, // TileByteCounts
    0x014A, // SubIFDs
    0x0152, // ExtraSamples
    0x0153, // SampleFormat
];

/// Resolution tags every TIFF encoder writes; alone they are not metadata.
const TIFF_DEFAULT_TAGS: &[u16] = &[0x011A, 0x011B, 0x0128];

fn is_layout_tag(tag: exif::Tag) -> bool {
    tag.context() == exif::Context::Tiff && TIFF_LAYOUT_TAGS.contains(&tag.number())
}

/// Rebuild an EXIF block from a TIFF file's primary IFD.
///
/// Returns `None` when the file carries nothing beyond its layout and
/// resolution tags.
fn read_tiff_exif(data: &[u8]) -> Option<Vec<u8>> {
    let parsed = match exif::Reader::new().read_raw(data.to_vec()) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("TIFF tags unreadable: {e}");
            return None;
        }
    };

    let fields: Vec<&exif::Field> = parsed
        .fields()
        .filter(|f| f.ifd_num == exif::In::PRIMARY)
        .filter(|f| !is_layout_tag(f.tag))
        .filter(|f| !matches!(f.value, exif::Value::Unknown(..)))
        .collect();

    let descriptive = fields.iter().any(|f| {
        f.tag.context() != exif::Context::Tiff || !TIFF_DEFAULT_TAGS.contains(&f.tag.number())
    });
    if !descriptive {
        return None;
    }

    let mut writer = exif::experimental::Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut block = Cursor::new(Vec::new());
    match writer.write(&mut block, parsed.little_endian()) {
        Ok(()) => Some(block.into_inner()),
        Err(e) => {
            log::warn!("TIFF tags could not be re-serialised as EXIF: {e}");
            None
        }
    }
}

/// Embed an EXIF block into already-encoded bytes of the given format.
///
/// Callers check [`OutputFormat::carries_exif`] first; other formats are a
/// processing error here.
pub fn embed_exif(encoded: Vec<u8>, format: OutputFormat, exif: &[u8]) -> Result<Vec<u8>, BackendError> {
    let mut output = Vec::with_capacity(encoded.len() + exif.len() + 16);
    match format {
        OutputFormat::Jpg | OutputFormat::Jpeg => {
            let mut jpeg = Jpeg::from_bytes(encoded.into()).map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to parse JPEG for EXIF embedding: {e}"))
            })?;
            jpeg.set_exif(Some(exif.to_vec().into()));
            jpeg.encoder().write_to(&mut output)?;
        }
        OutputFormat::Png => {
            let mut png = Png::from_bytes(encoded.into()).map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to parse PNG for EXIF embedding: {e}"))
            })?;
            png.set_exif(Some(exif.to_vec().into()));
            png.encoder().write_to(&mut output)?;
        }
        other => {
            return Err(BackendError::ProcessingFailed(format!(
                "{other} files cannot carry EXIF"
            )));
        }
    }
    Ok(output)
}
