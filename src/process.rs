//! Per-file resize pipeline and batch runner.
//!
//! Takes the worklist from the scan stage and turns every ready entry into an
//! output file. Files are independent: one failure never stops the batch.
//!
//! ## Per-file pipeline
//!
//! ```text
//! classify → resolve output path → create parent dir → capture timestamps
//!          → identify → read EXIF → plan → render + encode → atomic write
//! ```
//!
//! ## Error taxonomy
//!
//! | Error | Severity | Effect |
//! |---|---|---|
//! | [`ProcessError::InputNotFound`] | warning | file skipped |
//! | [`ProcessError::UnsupportedFormat`] | warning | file skipped |
//! | [`ProcessError::OutputCollision`] | warning | file skipped, first claimant kept |
//! | [`ProcessError::OutputDirectoryCreateFailed`] | error | file failed |
//! | [`ProcessError::ProcessingFailure`] | error | file failed |
//!
//! A missing codec is not in this table: [`RustBackend::initialize`] reports
//! it before any batch starts.
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon); the
//! global pool size comes from `processing.max_processes`. Reports come back in
//! worklist order regardless of completion order. Progress events are sent as
//! each file finishes.
//!
//! Output paths are claimed in worklist order before any work starts, so two
//! inputs that resolve to the same output (`a.jpg` and `a.png`, or same-named
//! files under `--recursive`) never race: the first is processed, the rest are
//! skipped.
//!
//! [`RustBackend::initialize`]: crate::imaging::RustBackend::initialize

use crate::imaging::{BackendError, ImageBackend, MetadataTransfer, RenderSettings, render_image};
use crate::metadata::{FileTimestamps, write_with_timestamps};
use crate::naming::{OutputTarget, ensure_parent_dir, resolve_output_path};
use crate::scan::{InputEntry, InputStatus};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{}: file not found", .path.display())]
    InputNotFound { path: PathBuf },
    #[error("{}: unsupported file type {:?}", .path.display(), .ext)]
    UnsupportedFormat { path: PathBuf, ext: String },
    #[error(
        "{}: output {} is already claimed by {}",
        .path.display(),
        .output.display(),
        .claimed_by.display()
    )]
    OutputCollision {
        path: PathBuf,
        output: PathBuf,
        claimed_by: PathBuf,
    },
    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to process {}: {source}", .path.display())]
    ProcessingFailure {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl ProcessError {
    pub fn severity(&self) -> Severity {
        match self {
            ProcessError::InputNotFound { .. }
            | ProcessError::UnsupportedFormat { .. }
            | ProcessError::OutputCollision { .. } => Severity::Warning,
            ProcessError::OutputDirectoryCreateFailed { .. }
            | ProcessError::ProcessingFailure { .. } => Severity::Error,
        }
    }

    fn processing(path: &Path, source: impl Into<BackendError>) -> Self {
        ProcessError::ProcessingFailure {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

/// Where outputs go and how they are rendered; shared by every file in a batch.
#[derive(Debug, Clone)]
pub struct ResizeRequest {
    pub target: OutputTarget,
    pub settings: RenderSettings,
}

/// What happened to the source EXIF block, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataStatus {
    /// Embedded verbatim in the output.
    Copied,
    /// Source had EXIF but the output format cannot carry it.
    Skipped,
    /// Source had no EXIF.
    Absent,
    /// Preservation was turned off.
    Disabled,
}

/// A successfully written output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutput {
    pub source: PathBuf,
    pub output: PathBuf,
    pub original: (u32, u32),
    pub width: u32,
    pub height: u32,
    pub metadata: MetadataStatus,
}

/// Run the whole pipeline for one worklist entry.
pub fn process_file(
    backend: &impl ImageBackend,
    entry: &InputEntry,
    request: &ResizeRequest,
) -> Result<FileOutput, ProcessError> {
    let source = entry.path.as_path();
    match &entry.status {
        InputStatus::Ready => {}
        InputStatus::Missing => {
            return Err(ProcessError::InputNotFound {
                path: source.to_path_buf(),
            });
        }
        InputStatus::Unsupported(ext) => {
            return Err(ProcessError::UnsupportedFormat {
                path: source.to_path_buf(),
                ext: ext.clone(),
            });
        }
    }

    let settings = &request.settings;
    let output = resolve_output_path(&request.target, source, settings.format);
    ensure_parent_dir(&output).map_err(|e| ProcessError::OutputDirectoryCreateFailed {
        path: output.parent().unwrap_or(Path::new(".")).to_path_buf(),
        source: e,
    })?;

    let times = FileTimestamps::capture(source).map_err(|e| ProcessError::processing(source, e))?;
    let rendered =
        render_image(backend, source, settings).map_err(|e| ProcessError::processing(source, e))?;

    let metadata = match (settings.preserve_metadata, rendered.encoded.metadata) {
        (false, _) => MetadataStatus::Disabled,
        (true, MetadataTransfer::Copied) => MetadataStatus::Copied,
        (true, MetadataTransfer::Absent) => MetadataStatus::Absent,
        (true, MetadataTransfer::Unsupported) => {
            log::warn!(
                "{}: {} output cannot carry EXIF, writing without it",
                source.display(),
                settings.format
            );
            MetadataStatus::Skipped
        }
    };

    write_with_timestamps(&output, &rendered.encoded.bytes, &times)
        .map_err(|e| ProcessError::processing(source, e))?;

    log::debug!(
        "{} ({}x{}) -> {} ({}x{})",
        source.display(),
        rendered.original.0,
        rendered.original.1,
        output.display(),
        rendered.width,
        rendered.height
    );

    Ok(FileOutput {
        source: source.to_path_buf(),
        output,
        original: rendered.original,
        width: rendered.width,
        height: rendered.height,
        metadata,
    })
}

// =============================================================================
// Batch reporting
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Written,
    Skipped,
    Failed,
}

/// Outcome of one worklist entry, as recorded in the batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FileReport {
    pub fn from_result(source: &Path, result: Result<FileOutput, ProcessError>) -> Self {
        match result {
            Ok(out) => FileReport {
                source: out.source,
                status: FileStatus::Written,
                output: Some(out.output),
                width: Some(out.width),
                height: Some(out.height),
                metadata: Some(out.metadata),
                message: None,
            },
            Err(e) => FileReport {
                source: source.to_path_buf(),
                status: match e.severity() {
                    Severity::Warning => FileStatus::Skipped,
                    Severity::Error => FileStatus::Failed,
                },
                output: None,
                width: None,
                height: None,
                metadata: None,
                message: Some(error_chain(&e)),
            },
        }
    }
}

/// Render an error with every `source()` cause appended.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        cause = inner.source();
    }
    message
}

/// Outcome of a whole run, in worklist order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn from_files(files: Vec<FileReport>) -> Self {
        let count = |status| files.iter().filter(|f| f.status == status).count();
        Self {
            written: count(FileStatus::Written),
            skipped: count(FileStatus::Skipped),
            failed: count(FileStatus::Failed),
            files,
        }
    }

    /// Skips don't count; only hard failures do.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written, {} skipped, {} failed",
            self.written, self.skipped, self.failed
        )
    }
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    BatchStarted { total: usize },
    FileFinished(FileReport),
}

/// For each entry, the output it would collide with and the earlier source
/// that already claimed it. Only ready entries claim outputs.
fn find_output_collisions<'a>(
    entries: &'a [InputEntry],
    request: &ResizeRequest,
) -> Vec<Option<(PathBuf, &'a Path)>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    entries
        .iter()
        .map(|entry| {
            if entry.status != InputStatus::Ready {
                return None;
            }
            let output = resolve_output_path(&request.target, &entry.path, request.settings.format);
            match claimed.entry(output) {
                Entry::Occupied(first) => Some((first.key().clone(), *first.get())),
                Entry::Vacant(slot) => {
                    slot.insert(&entry.path);
                    None
                }
            }
        })
        .collect()
}

/// Process every worklist entry, continuing past per-file errors.
pub fn process_batch(
    backend: &impl ImageBackend,
    entries: &[InputEntry],
    request: &ResizeRequest,
    progress: Option<Sender<ProcessEvent>>,
) -> BatchReport {
    if let Some(tx) = &progress {
        tx.send(ProcessEvent::BatchStarted {
            total: entries.len(),
        })
        .ok();
    }

    let collisions = find_output_collisions(entries, request);
    let files: Vec<FileReport> = entries
        .par_iter()
        .zip(collisions.par_iter())
        .map(|(entry, collision)| {
            let result = match collision {
                Some((output, first)) => Err(ProcessError::OutputCollision {
                    path: entry.path.clone(),
                    output: output.clone(),
                    claimed_by: first.to_path_buf(),
                }),
                None => process_file(backend, entry, request),
            };
            let report = FileReport::from_result(&entry.path, result);
            if let Some(tx) = &progress {
                tx.send(ProcessEvent::FileFinished(report.clone())).ok();
            }
            report
        })
        .collect();

    BatchReport::from_files(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::{Bounds, BackendError};
    use crate::types::OutputFormat;
    use std::fs;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    fn ready(path: PathBuf) -> InputEntry {
        InputEntry {
            path,
            status: InputStatus::Ready,
        }
    }

    /// Create an empty source file; the mock backend never decodes it.
    fn create_dummy_source(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    fn request(target: OutputTarget, settings: RenderSettings) -> ResizeRequest {
        ResizeRequest { target, settings }
    }

    fn dir_request(dir: &Path) -> ResizeRequest {
        request(OutputTarget::Directory(dir.to_path_buf()), RenderSettings::default())
    }

    // =========================================================================
    // Error taxonomy
    // =========================================================================

    #[test]
    fn severity_splits_skips_from_failures() {
        let path = PathBuf::from("a.jpg");
        assert_eq!(
            ProcessError::InputNotFound { path: path.clone() }.severity(),
            Severity::Warning
        );
        assert_eq!(
            ProcessError::UnsupportedFormat {
                path: path.clone(),
                ext: "txt".into()
            }
            .severity(),
            Severity::Warning
        );
        assert_eq!(
            ProcessError::OutputCollision {
                path: path.clone(),
                output: PathBuf::from("out/a.jpg"),
                claimed_by: PathBuf::from("a.png"),
            }
            .severity(),
            Severity::Warning
        );
        assert_eq!(
            ProcessError::OutputDirectoryCreateFailed {
                path: path.clone(),
                source: std::io::Error::other("denied"),
            }
            .severity(),
            Severity::Error
        );
        assert_eq!(
            ProcessError::ProcessingFailure {
                path,
                source: BackendError::ProcessingFailed("bad".into()),
            }
            .severity(),
            Severity::Error
        );
    }

    #[test]
    fn not_found_message_names_the_file() {
        let err = ProcessError::InputNotFound {
            path: PathBuf::from("/in/gone.jpg"),
        };
        assert_eq!(err.to_string(), "/in/gone.jpg: file not found");
    }

    // =========================================================================
    // process_file
    // =========================================================================

    #[test]
    fn missing_entry_is_not_found_without_backend_calls() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let entry = InputEntry {
            path: tmp.path().join("gone.jpg"),
            status: InputStatus::Missing,
        };

        let result = process_file(&backend, &entry, &dir_request(tmp.path()));
        assert!(matches!(result, Err(ProcessError::InputNotFound { .. })));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn unsupported_entry_carries_extension() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let entry = InputEntry {
            path: tmp.path().join("notes.txt"),
            status: InputStatus::Unsupported("txt".into()),
        };

        match process_file(&backend, &entry, &dir_request(tmp.path())) {
            Err(ProcessError::UnsupportedFormat { ext, .. }) => assert_eq!(ext, "txt"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn fit_width_writes_resized_output() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("wide.jpg");
        create_dummy_source(&source);
        let out_dir = tmp.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let backend = MockBackend::with_dimensions(&[("wide.jpg", 1600, 900)]);
        let settings = RenderSettings {
            bounds: Bounds::new(Some(800), None),
            ..RenderSettings::default()
        };
        let req = request(OutputTarget::Directory(out_dir.clone()), settings);

        let out = process_file(&backend, &ready(source), &req).unwrap();
        assert_eq!(out.output, out_dir.join("wide.jpg"));
        assert_eq!((out.width, out.height), (800, 450));
        assert_eq!(out.original, (1600, 900));
        assert_eq!(fs::read(&out.output).unwrap(), b"800x450.jpg");
        assert_eq!(out.metadata, MetadataStatus::Absent);
    }

    #[test]
    fn stretch_to_exact_bounds() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("small.png");
        create_dummy_source(&source);

        let backend = MockBackend::with_dimensions(&[("small.png", 800, 450)]);
        let settings = RenderSettings {
            bounds: Bounds::new(Some(1000), Some(500)),
            preserve_ratio: false,
            format: OutputFormat::Png,
            ..RenderSettings::default()
        };
        let target = OutputTarget::File(tmp.path().join("result.png"));

        let out = process_file(&backend, &ready(source), &request(target, settings)).unwrap();
        assert_eq!((out.width, out.height), (1000, 500));
        assert_eq!(out.output, tmp.path().join("result.png"));
    }

    #[test]
    fn output_extension_follows_format() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photo.jpeg");
        create_dummy_source(&source);
        let out_dir = tmp.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let backend = MockBackend::with_dimensions(&[("photo.jpeg", 10, 10)]);
        let settings = RenderSettings {
            format: OutputFormat::Gif,
            ..RenderSettings::default()
        };
        let req = request(OutputTarget::Directory(out_dir.clone()), settings);

        let out = process_file(&backend, &ready(source), &req).unwrap();
        assert_eq!(out.output, out_dir.join("photo.gif"));
    }

    #[test]
    fn missing_parent_directories_are_created() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.jpg");
        create_dummy_source(&source);
        let target = OutputTarget::File(tmp.path().join("deep/nested/a.jpg"));

        let backend = MockBackend::with_dimensions(&[("a.jpg", 10, 10)]);
        let out = process_file(
            &backend,
            &ready(source),
            &request(target, RenderSettings::default()),
        )
        .unwrap();
        assert!(out.output.exists());
    }

    #[test]
    fn blocked_parent_is_directory_create_failure() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.jpg");
        create_dummy_source(&source);
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let target = OutputTarget::File(blocker.join("a.jpg"));

        let backend = MockBackend::with_dimensions(&[("a.jpg", 10, 10)]);
        let result = process_file(
            &backend,
            &ready(source),
            &request(target, RenderSettings::default()),
        );
        assert!(matches!(
            result,
            Err(ProcessError::OutputDirectoryCreateFailed { .. })
        ));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn backend_failure_is_processing_failure_and_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("bad.jpg");
        create_dummy_source(&source);
        let out_dir = tmp.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let backend = MockBackend::with_dimensions(&[("bad.jpg", 10, 10)]).failing_on("bad.jpg");
        let result = process_file(&backend, &ready(source), &dir_request(&out_dir));

        assert!(matches!(result, Err(ProcessError::ProcessingFailure { .. })));
        assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 0);
    }

    #[test]
    fn output_keeps_source_modified_time() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("old.jpg");
        create_dummy_source(&source);
        let stamp = UNIX_EPOCH + Duration::from_secs(1_300_000_000);
        fs::File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(stamp)
            .unwrap();
        let out_dir = tmp.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let backend = MockBackend::with_dimensions(&[("old.jpg", 10, 10)]);
        let settings = RenderSettings {
            preserve_metadata: false,
            ..RenderSettings::default()
        };
        let req = request(OutputTarget::Directory(out_dir), settings);

        let out = process_file(&backend, &ready(source), &req).unwrap();
        assert_eq!(fs::metadata(&out.output).unwrap().modified().unwrap(), stamp);
        assert_eq!(out.metadata, MetadataStatus::Disabled);
    }

    #[test]
    fn exif_is_handed_to_backend_when_preserving() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("tagged.jpg");
        create_dummy_source(&source);
        let out_dir = tmp.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let backend =
            MockBackend::with_dimensions(&[("tagged.jpg", 10, 10)]).with_exif("tagged.jpg", b"II*\0x");
        let out = process_file(&backend, &ready(source), &dir_request(&out_dir)).unwrap();

        assert_eq!(out.metadata, MetadataStatus::Copied);
        let resizes = backend.resizes();
        assert!(matches!(
            &resizes[0],
            RecordedOp::Resize { exif: Some(block), .. } if block == b"II*\0x"
        ));
    }

    #[test]
    fn exif_on_gif_target_is_skipped_not_failed() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("tagged.jpg");
        create_dummy_source(&source);
        let out_dir = tmp.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let backend =
            MockBackend::with_dimensions(&[("tagged.jpg", 10, 10)]).with_exif("tagged.jpg", b"II*\0");
        let settings = RenderSettings {
            format: OutputFormat::Gif,
            ..RenderSettings::default()
        };
        let req = request(OutputTarget::Directory(out_dir), settings);

        let out = process_file(&backend, &ready(source), &req).unwrap();
        assert_eq!(out.metadata, MetadataStatus::Skipped);
        assert!(out.output.exists());
    }

    // =========================================================================
    // process_batch
    // =========================================================================

    #[test]
    fn batch_counts_written_skipped_failed_in_order() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.jpg");
        let bad = tmp.path().join("bad.png");
        create_dummy_source(&good);
        create_dummy_source(&bad);
        let out_dir = tmp.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let entries = vec![
            ready(good.clone()),
            InputEntry {
                path: tmp.path().join("gone.jpg"),
                status: InputStatus::Missing,
            },
            ready(bad.clone()),
            InputEntry {
                path: tmp.path().join("notes.txt"),
                status: InputStatus::Unsupported("txt".into()),
            },
        ];
        let backend = MockBackend::with_dimensions(&[("good.jpg", 100, 50), ("bad.png", 10, 10)])
            .failing_on("bad.png");

        let report = process_batch(&backend, &entries, &dir_request(&out_dir), None);

        assert_eq!((report.written, report.skipped, report.failed), (1, 2, 1));
        assert!(report.has_failures());
        let statuses: Vec<_> = report.files.iter().map(|f| f.status).collect();
        assert_eq!(
            statuses,
            vec![
                FileStatus::Written,
                FileStatus::Skipped,
                FileStatus::Failed,
                FileStatus::Skipped
            ]
        );
        assert_eq!(report.files[0].source, good);
        assert_eq!(report.files[2].source, bad);
        assert!(report.files[2].message.as_deref().unwrap().contains("mock encode failure"));
        assert_eq!(report.to_string(), "1 written, 2 skipped, 1 failed");
    }

    #[test]
    fn same_stem_inputs_keep_first_and_skip_the_rest() {
        let tmp = TempDir::new().unwrap();
        let a_jpg = tmp.path().join("a.jpg");
        let a_png = tmp.path().join("a.png");
        create_dummy_source(&a_jpg);
        create_dummy_source(&a_png);
        let out_dir = tmp.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let backend = MockBackend::with_dimensions(&[("a.jpg", 40, 30), ("a.png", 30, 40)]);
        let entries = vec![ready(a_jpg.clone()), ready(a_png.clone())];
        let report = process_batch(&backend, &entries, &dir_request(&out_dir), None);

        assert_eq!((report.written, report.skipped, report.failed), (1, 1, 0));
        assert_eq!(report.files[0].output, Some(out_dir.join("a.jpg")));
        assert_eq!(report.files[1].status, FileStatus::Skipped);
        let message = report.files[1].message.as_deref().unwrap();
        assert!(message.contains("already claimed"), "{message}");
        assert!(message.contains(&a_jpg.display().to_string()), "{message}");

        // Only the first claimant reached the backend
        assert_eq!(backend.resizes().len(), 1);
        assert_eq!(fs::read(out_dir.join("a.jpg")).unwrap(), b"40x30.jpg");
    }

    #[test]
    fn collisions_ignore_entries_that_are_not_ready() {
        let tmp = TempDir::new().unwrap();
        let entries = vec![
            InputEntry {
                path: tmp.path().join("a.png"),
                status: InputStatus::Missing,
            },
            ready(tmp.path().join("a.jpg")),
        ];
        let collisions = find_output_collisions(&entries, &dir_request(tmp.path()));
        assert!(collisions.iter().all(Option::is_none));
    }

    #[test]
    fn batch_with_only_skips_has_no_failures() {
        let tmp = TempDir::new().unwrap();
        let entries = vec![InputEntry {
            path: tmp.path().join("gone.jpg"),
            status: InputStatus::Missing,
        }];
        let report = process_batch(&MockBackend::new(), &entries, &dir_request(tmp.path()), None);
        assert!(!report.has_failures());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn batch_emits_progress_events() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.jpg");
        let b = tmp.path().join("b.jpg");
        create_dummy_source(&a);
        create_dummy_source(&b);
        let out_dir = tmp.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let backend = MockBackend::with_dimensions(&[("a.jpg", 10, 10), ("b.jpg", 20, 20)]);
        let (tx, rx) = std::sync::mpsc::channel();
        process_batch(&backend, &[ready(a), ready(b)], &dir_request(&out_dir), Some(tx));

        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], ProcessEvent::BatchStarted { total: 2 }));
        assert!(
            events[1..]
                .iter()
                .all(|e| matches!(e, ProcessEvent::FileFinished(r) if r.status == FileStatus::Written))
        );
    }

    #[test]
    fn report_serializes_without_empty_fields() {
        let report = BatchReport::from_files(vec![FileReport::from_result(
            Path::new("gone.jpg"),
            Err(ProcessError::InputNotFound {
                path: PathBuf::from("gone.jpg"),
            }),
        )]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skipped"], 1);
        assert_eq!(json["files"][0]["status"], "skipped");
        assert_eq!(json["files"][0]["message"], "gone.jpg: file not found");
        assert!(json["files"][0].get("output").is_none());
    }

    #[test]
    fn error_chain_includes_io_cause() {
        let err = ProcessError::OutputDirectoryCreateFailed {
            path: PathBuf::from("/out"),
            source: std::io::Error::other("permission denied"),
        };
        let message = error_chain(&err);
        assert_eq!(message.matches("permission denied").count(), 1);
    }
}
