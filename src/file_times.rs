//! Access/modify time handling and atomic content writes.

use std::fs::{self, File, FileTimes};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tempfile::NamedTempFile;

use crate::errors::{MetadateError, Result};

/// Access and modify times of a file, as read before touching it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FileTimestamps {
    pub accessed: SystemTime,
    pub modified: SystemTime,
}

fn to_epoch(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        // Before 1970, round towards the past like a stat tuple would
        Err(e) => {
            let d = e.duration();
            let secs = d.as_secs() as i64;
            if d.subsec_nanos() > 0 { -secs - 1 } else { -secs }
        }
    }
}

fn from_epoch(epoch: i64) -> SystemTime {
    if epoch >= 0 {
        UNIX_EPOCH + Duration::from_secs(epoch as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs(epoch.unsigned_abs())
    }
}

impl FileTimestamps {
    pub fn from_epochs(accessed: i64, modified: i64) -> FileTimestamps {
        FileTimestamps {
            accessed: from_epoch(accessed),
            modified: from_epoch(modified),
        }
    }

    pub fn read(path: &Path) -> Result<FileTimestamps> {
        let meta = fs::metadata(path).map_err(|e| MetadateError::read(path, e))?;
        let accessed = meta.accessed().map_err(|e| MetadateError::read(path, e))?;
        let modified = meta.modified().map_err(|e| MetadateError::read(path, e))?;
        Ok(FileTimestamps { accessed, modified })
    }

    pub fn accessed_epoch(&self) -> i64 {
        to_epoch(self.accessed)
    }

    pub fn modified_epoch(&self) -> i64 {
        to_epoch(self.modified)
    }

    /// Same access time, modify time moved to `epoch`.
    pub fn with_modified_epoch(&self, epoch: i64) -> FileTimestamps {
        FileTimestamps {
            accessed: self.accessed,
            modified: from_epoch(epoch),
        }
    }

    fn as_file_times(&self) -> FileTimes {
        FileTimes::new()
            .set_accessed(self.accessed)
            .set_modified(self.modified)
    }
}

/// Sets both times of `path`. Nothing else about the file changes.
/// The owner of a read-only file can still change its times, so the file is
/// only opened for writing where the platform requires it.
pub fn set_times(path: &Path, times: &FileTimestamps) -> Result<()> {
    let file = open_for_times(path).map_err(|e| MetadateError::write(path, e))?;
    file.set_times(times.as_file_times())
        .map_err(|e| MetadateError::write(path, e))
}

#[cfg(unix)]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    File::open(path)
}

#[cfg(not(unix))]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    File::options().write(true).open(path)
}

/// Replaces the content of `path` and leaves it with the given times.
///
/// Symlinks are followed, the file they point to is the one replaced. The new
/// content goes to a temporary file in the same directory as that file.
/// Permissions and times are copied onto it and only then it is renamed over
/// the original, so a failure at any step leaves the original file as it was.
pub fn write_atomic(path: &Path, content: &[u8], times: &FileTimestamps) -> Result<()> {
    let write_err = |e: std::io::Error| MetadateError::write(path, e);

    let target = fs::canonicalize(path).map_err(write_err)?;
    let dir = match target.parent() {
        Some(parent) => parent,
        None => Path::new("."),
    };

    let permissions = fs::metadata(&target).map_err(write_err)?.permissions();

    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp_file.write_all(content).map_err(write_err)?;
    temp_file.as_file().sync_all().map_err(write_err)?;
    fs::set_permissions(temp_file.path(), permissions).map_err(write_err)?;
    temp_file.as_file().set_times(times.as_file_times()).map_err(write_err)?;

    temp_file.persist(&target).map_err(|e| MetadateError::write(path, e.error))?;

    Ok(())
}
