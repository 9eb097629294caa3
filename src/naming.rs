//! Output path resolution.
//!
//! Every output path is derived from the user's `--output` argument, the input
//! file, and the output format:
//!
//! - `--output` is an existing directory → `<dir>/<input file name>`
//! - otherwise → `--output` as given
//! - either way the extension is replaced with the format token, so
//!   `photo.jpeg` converted to PNG lands at `photo.png`, and `-o out.jpg -f gif`
//!   writes `out.gif`.
//!
//! ```text
//! resize -o thumbs/  a/cat.JPG -f png   →  thumbs/cat.png
//! resize -o cover.jpg a/cat.png         →  cover.jpg
//! resize -o cover.jpg a/cat.png -f bmp  →  cover.bmp
//! ```

use crate::types::OutputFormat;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The `--output` argument, classified once per batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Outputs keep their input file names inside this directory.
    Directory(PathBuf),
    /// Every output is written to this path (extension forced to the format).
    File(PathBuf),
}

impl OutputTarget {
    /// Classify `output` by what exists on disk right now.
    pub fn detect(output: &Path) -> Self {
        if output.is_dir() {
            OutputTarget::Directory(output.to_path_buf())
        } else {
            OutputTarget::File(output.to_path_buf())
        }
    }

    /// Classify `output` for a batch run.
    ///
    /// A multi-file batch aimed at a path that doesn't exist yet gets that path
    /// created as a directory; otherwise every file would resolve to the same
    /// output and overwrite its predecessor.
    pub fn prepare(output: &Path, multi_file: bool) -> io::Result<Self> {
        if multi_file && !output.exists() {
            fs::create_dir_all(output)?;
            log::debug!("created output directory {}", output.display());
        }
        Ok(Self::detect(output))
    }
}

/// Resolve the concrete output path for one input file.
pub fn resolve_output_path(target: &OutputTarget, input: &Path, format: OutputFormat) -> PathBuf {
    let base = match target {
        OutputTarget::Directory(dir) => match input.file_name() {
            Some(name) => dir.join(name),
            None => dir.join("output"),
        },
        OutputTarget::File(path) => path.clone(),
    };
    base.with_extension(format.extension())
}

/// Create the parent directory of `path` (and intermediates) if missing.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}
