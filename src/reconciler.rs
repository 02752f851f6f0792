use std::path::Path;

use crate::entry::Entry;
use crate::errors::{MetadateError, Result};
use crate::file_times::{set_times, write_atomic, FileTimestamps};
use crate::published::{display_epoch, find_published, format_published, parse_published_near};

/// What has to happen to a file to keep its published line and mtime in sync.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    /// Rewrite the file with `tag_line` as first metadata line, then put the
    /// times read before the write back.
    InsertTag {
        tag_line: String,
        content: String,
        times: FileTimestamps,
    },
    /// Move the mtime from `current` to the `stored` epoch of the published line.
    RestoreMtime {
        current: i64,
        stored: i64,
        times: FileTimestamps,
    },
}

impl Action {
    pub fn is_none(&self) -> bool {
        matches!(self, Action::None)
    }

    /// Times the file has once this action is applied.
    pub fn resulting_times(&self, current: &FileTimestamps) -> FileTimestamps {
        match self {
            Action::None => *current,
            Action::InsertTag { times, .. } | Action::RestoreMtime { times, .. } => *times,
        }
    }

    /// Progress line for this action. Dry runs report the same decision as
    /// something that would happen.
    pub fn report(&self, path: &Path, dry_run: bool) -> Option<String> {
        let path = path.display();
        match self {
            Action::None => None,
            Action::InsertTag { tag_line, .. } if dry_run => {
                Some(format!("{} needs to be added to {}", tag_line.trim_end(), path))
            }
            Action::InsertTag { tag_line, .. } => {
                Some(format!("Adding {} to {}", tag_line.trim_end(), path))
            }
            Action::RestoreMtime { stored, .. } if dry_run => {
                Some(format!("mtime of {} needs to be reset to {}", path, display_epoch(*stored)))
            }
            Action::RestoreMtime { stored, .. } => {
                Some(format!("Restoring mtime of {} to {}", path, display_epoch(*stored)))
            }
        }
    }
}

/// Stamps an entry without published line with its current mtime.
/// Entries that already have one are never touched, whatever the value is.
pub fn record(entry: &Entry, times: &FileTimestamps) -> Result<Action> {
    // Nothing to stamp, and a tag would become the title
    if entry.is_empty() {
        return Ok(Action::None);
    }

    if find_published(&entry.metadata).is_some() {
        return Ok(Action::None);
    }

    let tag_line = format_published(times.modified_epoch())?;
    let content = entry.with_metadata_first(&tag_line).to_content();

    Ok(Action::InsertTag {
        tag_line,
        content,
        times: *times,
    })
}

/// Moves the mtime back to the value stored in the published line, if any.
pub fn reconcile(path: &Path, entry: &Entry, times: &FileTimestamps) -> Result<Action> {
    let Some(line) = find_published(&entry.metadata) else {
        return Ok(Action::None);
    };

    let current = times.modified_epoch();
    let stored = parse_published_near(line, Some(current)).map_err(|_| MetadateError::MalformedTag {
        path: path.to_path_buf(),
        line: line.trim_end().to_string(),
    })?;

    if stored == current {
        return Ok(Action::None);
    }

    Ok(Action::RestoreMtime {
        current,
        stored,
        times: times.with_modified_epoch(stored),
    })
}

pub fn apply(path: &Path, action: &Action) -> Result<()> {
    match action {
        Action::None => Ok(()),
        Action::InsertTag { content, times, .. } => write_atomic(path, content.as_bytes(), times),
        Action::RestoreMtime { times, .. } => set_times(path, times),
    }
}
