//! # Simple Resize
//!
//! A batch image resizer. Point it at a file, a directory, or a list of paths
//! on stdin; every supported image is fitted into a bounding box (or stretched
//! to it), re-encoded in the chosen format, and written with the source's
//! EXIF block and timestamps carried over.
//!
//! # Architecture: Scan, then Process
//!
//! ```text
//! 1. Scan      inputs    →  worklist      (paths, directories, stdin → classified entries)
//! 2. Process   worklist  →  output files  (identify → plan → render → atomic write)
//! ```
//!
//! Input handling is finished before the first image is decoded, so the
//! processing stage only ever sees a flat, ordered list. Every file is
//! independent; a bad file is reported and the batch moves on.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Classifies inputs, expands directories and stdin into the worklist |
//! | [`process`] | Per-file pipeline, error taxonomy, parallel batch runner, batch report |
//! | [`imaging`] | Dimension math, EXIF block transfer, and the `image`-crate backend |
//! | [`naming`] | Output path resolution and extension forcing |
//! | [`metadata`] | Timestamp capture and atomic, timestamp-preserving writes |
//! | [`config`] | Layered TOML configuration: stock defaults, config file, CLI flags |
//! | [`types`] | Output formats and rendering-quality enums shared across layers |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Backend Trait
//!
//! All pixel work goes through [`imaging::ImageBackend`]. Production uses
//! [`imaging::RustBackend`]; tests use a recording mock, so pipeline logic is
//! exercised without decoding a single image.
//!
//! ## Explicit Environment Check
//!
//! [`imaging::RustBackend::initialize`] verifies that every codec the tool
//! can emit is compiled in. Callers hold the backend value it returns, so a
//! batch cannot start against a half-working environment.
//!
//! ## Exact Dimension Math
//!
//! The fit ratio is kept as an integer fraction, so `floor(W × ratio)` is exact
//! and never rounds a 100×49 source off by one.
//!
//! ## Write Once, Rename
//!
//! Outputs are encoded in memory, written to a temporary file next to the
//! destination, stamped with the source timestamps, and renamed into place.
//! Nothing partial is ever visible at the output path.

pub mod config;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
