//! Lookup used by the publishing engine when it stats an entry: the published
//! line, when there is one, is the date of the entry instead of its mtime.

use std::path::Path;

use spdlog::{error, warn};

use crate::entry::Entry;
use crate::file_times::FileTimestamps;
use crate::published::{find_published, parse_published_near};

pub struct StatRequest<'a> {
    pub data_dir: &'a Path,
    pub file_name: &'a Path,
}

/// Returns `default` with the modify time taken from the entry's published
/// line. Unreadable entries and malformed lines leave `default` untouched.
pub fn published_mtime(request: &StatRequest, default: FileTimestamps) -> FileTimestamps {
    let path = request.data_dir.join(request.file_name);
    let entry = match Entry::from_file(&path) {
        Ok(entry) => entry,
        Err(e) => {
            error!("{}", e);
            return default;
        }
    };

    let Some(line) = find_published(&entry.metadata) else {
        return default;
    };

    match parse_published_near(line, Some(default.modified_epoch())) {
        Ok(epoch) => default.with_modified_epoch(epoch),
        Err(e) => {
            warn!("{} - file={}", e, path.display());
            default
        }
    }
}
