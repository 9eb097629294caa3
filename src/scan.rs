//! Input classification and worklist construction.
//!
//! All inputs (command-line paths, stdin path lists, directories) are
//! expanded once into a flat, ordered worklist of [`InputEntry`] values
//! before any image is touched. The processing stage then iterates that list;
//! it never re-enters input handling.
//!
//! ## Classification
//!
//! | Input | Result |
//! |---|---|
//! | directory | its immediate files, sorted by name (sub-directories ignored) |
//! | directory with `recursive` | every file below it, sorted walk order |
//! | missing path | [`InputStatus::Missing`] |
//! | file with an unsupported extension | [`InputStatus::Unsupported`] |
//! | file with jpg/jpeg/png/gif/bmp/tiff extension (any case) | [`InputStatus::Ready`] |
//! | unreadable directory or sub-directory | warning, contributes nothing |
//!
//! Files found inside directories go through the same extension check, so an
//! unsupported file next to valid images shows up as a skip, not silence.

use crate::types::OutputFormat;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// How an input path was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputStatus {
    Ready,
    Missing,
    /// Holds the offending extension (empty when the file has none).
    Unsupported(String),
}

/// One worklist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEntry {
    pub path: PathBuf,
    pub status: InputStatus,
}

/// The expanded set of inputs for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Worklist {
    pub entries: Vec<InputEntry>,
    /// True when a directory was expanded or several paths were given.
    pub multi_file: bool,
}

impl Worklist {
    pub fn ready_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == InputStatus::Ready)
            .count()
    }
}

/// Classify a single non-directory path.
pub fn classify_file(path: &Path) -> InputStatus {
    if !path.exists() {
        return InputStatus::Missing;
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    match OutputFormat::from_extension(&ext) {
        Some(_) => InputStatus::Ready,
        None => InputStatus::Unsupported(ext),
    }
}

fn entry(path: PathBuf) -> InputEntry {
    let status = classify_file(&path);
    InputEntry { path, status }
}

/// List a directory's immediate files in name order.
///
/// An unreadable directory or entry is logged and left out; it never stops
/// the rest of the listing.
pub fn list_directory(dir: &Path) -> Vec<PathBuf> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(source) => {
            warn_unreadable(ScanError::Io {
                path: dir.to_path_buf(),
                source,
            });
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for item in read {
        match item {
            Ok(item) => {
                let path = item.path();
                if path.is_file() {
                    files.push(path);
                } else {
                    log::debug!("not descending into {}", path.display());
                }
            }
            Err(source) => warn_unreadable(ScanError::Io {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }
    files.sort();
    files
}

/// List every file below a directory, depth-first in name order.
///
/// Unreadable sub-directories are logged and skipped; their siblings are
/// still walked.
pub fn walk_directory(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for item in WalkDir::new(dir).sort_by_file_name() {
        match item {
            Ok(item) if item.file_type().is_file() => files.push(item.into_path()),
            Ok(_) => {}
            Err(e) => warn_unreadable(e.into()),
        }
    }
    files
}

fn warn_unreadable(err: ScanError) {
    log::warn!("skipping unreadable input: {err}");
}

/// Expand raw input paths into a worklist.
pub fn build_worklist(inputs: &[PathBuf], recursive: bool) -> Worklist {
    let mut worklist = Worklist {
        entries: Vec::new(),
        multi_file: inputs.len() > 1,
    };

    for input in inputs {
        if input.is_dir() {
            worklist.multi_file = true;
            let files = if recursive {
                walk_directory(input)
            } else {
                list_directory(input)
            };
            log::debug!("{}: {} files", input.display(), files.len());
            worklist.entries.extend(files.into_iter().map(entry));
        } else {
            worklist.entries.push(entry(input.clone()));
        }
    }

    worklist
}

/// Read newline-separated paths, ignoring blank lines and surrounding whitespace.
pub fn read_path_list(reader: impl BufRead) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            paths.push(PathBuf::from(trimmed));
        }
    }
    Ok(paths)
}

/// Replace every `-` argument with the paths piped on stdin.
pub fn expand_stdin_inputs(inputs: Vec<PathBuf>, stdin: impl BufRead) -> io::Result<Vec<PathBuf>> {
    if !inputs.iter().any(|p| p.as_os_str() == "-") {
        return Ok(inputs);
    }
    let piped = read_path_list(stdin)?;
    let mut expanded = Vec::with_capacity(inputs.len() + piped.len());
    let mut piped = Some(piped);
    for input in inputs {
        if input.as_os_str() == "-" {
            // A second `-` has nothing left to read
            if let Some(paths) = piped.take() {
                expanded.extend(paths);
            }
        } else {
            expanded.push(input);
        }
    }
    Ok(expanded)
}
