//! CLI output formatting.
//!
//! Each written file gets one line on stdout naming the source and where it
//! went. Skips and failures are routed through the `log` facade instead, so
//! `--log-level` controls them and stdout stays a clean list of outputs.
//!
//! ```text
//! photos/dawn.jpg → thumbs/dawn.jpg (800x450)
//! photos/tagged.jpg → thumbs/tagged.gif (320x240, EXIF not carried)
//! 2 written, 1 skipped, 0 failed
//! ```
//!
//! # Architecture
//!
//! `format_*` functions (returning `Vec<String>`) are pure, no I/O and no side
//! effects, for testability. `print_*` wrappers do the writing.

use crate::process::{BatchReport, FileReport, FileStatus, MetadataStatus, ProcessEvent};

/// Format one file's outcome as display lines.
pub fn format_file_report(report: &FileReport) -> Vec<String> {
    let source = report.source.display();
    match report.status {
        FileStatus::Written => {
            let output = report
                .output
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let size = match (report.width, report.height) {
                (Some(w), Some(h)) => format!("{w}x{h}"),
                _ => "?".to_string(),
            };
            let note = match report.metadata {
                Some(MetadataStatus::Skipped) => ", EXIF not carried",
                _ => "",
            };
            vec![format!("{source} → {output} ({size}{note})")]
        }
        FileStatus::Skipped | FileStatus::Failed => {
            let reason = report.message.as_deref().unwrap_or("unknown error");
            vec![reason.to_string()]
        }
    }
}

/// Format the end-of-run summary.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    vec![report.to_string()]
}

/// Format a progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { total } => {
            let noun = if *total == 1 { "file" } else { "files" };
            vec![format!("Resizing {total} {noun}")]
        }
        ProcessEvent::FileFinished(report) => format_file_report(report),
    }
}

/// Print a file's outcome: written to stdout, skips as warnings, failures as errors.
pub fn print_file_report(report: &FileReport) {
    for line in format_file_report(report) {
        match report.status {
            FileStatus::Written => println!("{}", line),
            FileStatus::Skipped => log::warn!("skipped {}", line),
            FileStatus::Failed => log::error!("{}", line),
        }
    }
}

/// Print a progress event. The batch header only appears at `info` level.
pub fn print_process_event(event: &ProcessEvent) {
    match event {
        ProcessEvent::BatchStarted { .. } => {
            for line in format_process_event(event) {
                log::info!("{}", line);
            }
        }
        ProcessEvent::FileFinished(report) => print_file_report(report),
    }
}

/// Print the summary line to stderr at `info` level.
pub fn print_batch_summary(report: &BatchReport) {
    for line in format_batch_summary(report) {
        log::info!("{}", line);
    }
}
