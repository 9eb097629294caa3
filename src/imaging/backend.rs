//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: identify, read_exif, and resize.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and built on the
//! `image` crate. Backends never touch the destination path: `resize` returns
//! the encoded bytes and the caller owns the write.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Imaging environment unavailable: {0}")]
    EnvironmentUnavailable(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// What happened to the source EXIF block during a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataTransfer {
    /// Block embedded verbatim.
    Copied,
    /// Source had a block, but the target format cannot carry it.
    Unsupported,
    /// No block was handed to the backend.
    Absent,
}

/// Encoded output of a resize, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub metadata: MetadataTransfer,
}

/// Trait for image processing backends.
///
/// Every backend must implement all three operations so the rest of the
/// codebase is backend-agnostic.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Read the embedded EXIF block, if the source format carries one.
    fn read_exif(&self, path: &Path) -> Result<Option<Vec<u8>>, BackendError>;

    /// Decode, render at the target size, and encode.
    fn resize(&self, params: &ResizeParams) -> Result<Encoded, BackendError>;
}
