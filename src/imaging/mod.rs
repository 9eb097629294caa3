//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **EXIF block** | `img-parts` (JPEG APP1, PNG eXIf) |
//! | **Resize** | `resize_exact` with a filter picked from the interpolation mode |
//! | **Encode** | JPEG (with quality), PNG, GIF, BMP, TIFF |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod exif;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, Encoded, ImageBackend, MetadataTransfer};
pub use calculations::calculate_target_dimensions;
pub use operations::{RenderSettings, RenderedImage, get_dimensions, plan_resize, render_image};
pub use params::{Bounds, Quality, ResizeParams};
pub use rust_backend::RustBackend;
