//! Filesystem metadata carried from a source file to its output.
//!
//! ## Timestamps
//!
//! The output's last-modified time is always set to the source's, whether or
//! not EXIF is preserved. The creation time is restored where the platform
//! lets a process set it (Windows, macOS); on Linux the birth time is owned by
//! the kernel and the output keeps its own.
//!
//! ## Atomic placement
//!
//! Outputs are written to a temporary file next to the destination, stamped,
//! and renamed into place. A failed encode or write leaves nothing behind, and
//! an existing output is only replaced by a complete file. Since a rename keeps
//! the inode, the timestamps applied to the temp file survive the move.

use std::fs::{self, File, FileTimes};
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

/// Timestamps captured from a source file before processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimestamps {
    pub modified: SystemTime,
    /// `None` when the filesystem doesn't record a birth time.
    pub created: Option<SystemTime>,
}

/// Whether [`FileTimestamps::apply`] can restore creation times on this platform.
pub const fn creation_time_settable() -> bool {
    cfg!(any(windows, target_os = "macos"))
}

impl FileTimestamps {
    pub fn capture(path: &Path) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            modified: meta.modified()?,
            created: meta.created().ok(),
        })
    }

    /// Stamp an open file. The handle must have write access.
    pub fn apply(&self, file: &File) -> io::Result<()> {
        let times = FileTimes::new().set_modified(self.modified);
        file.set_times(with_created(times, self.created))
    }
}

#[cfg(windows)]
fn with_created(times: FileTimes, created: Option<SystemTime>) -> FileTimes {
    use std::os::windows::fs::FileTimesExt;
    match created {
        Some(t) => times.set_created(t),
        None => times,
    }
}

#[cfg(target_os = "macos")]
fn with_created(times: FileTimes, created: Option<SystemTime>) -> FileTimes {
    use std::os::macos::fs::FileTimesExt;
    match created {
        Some(t) => times.set_created(t),
        None => times,
    }
}

#[cfg(not(any(windows, target_os = "macos")))]
fn with_created(times: FileTimes, _created: Option<SystemTime>) -> FileTimes {
    times
}

/// Write `bytes` to `dest` atomically, stamped with `times`.
///
/// The parent directory must already exist.
pub fn write_with_timestamps(dest: &Path, bytes: &[u8], times: &FileTimestamps) -> io::Result<()> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".simple-resize-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    // Temp files are created owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))?;
    }

    times.apply(tmp.as_file())?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
