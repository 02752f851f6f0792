use std::fs;
use std::path::{Path, PathBuf};

use spdlog::{debug, error, info, warn};

use crate::entry::Entry;
use crate::errors::{MetadateError, Result};
use crate::file_times::FileTimestamps;
use crate::published::display_epoch;
use crate::reconciler::{apply, reconcile, record, Action};

pub const DEFAULT_EXTENSION: &str = ".txt";

/// Built once from the command line and the config file, then passed down.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub recursive: bool,
    pub verbose: bool,
    pub dry_run: bool,
    pub reset_mtimes: bool,
    pub extension: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            recursive: false,
            verbose: false,
            dry_run: false,
            reset_mtimes: false,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Decisions taken for one file, in the order they ran.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileOutcome {
    pub restore: Option<Action>,
    pub stamp: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub stamped: usize,
    pub restored: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn add(&mut self, outcome: &FileOutcome) {
        self.processed += 1;
        if outcome.restore.as_ref().is_some_and(|a| !a.is_none()) {
            self.restored += 1;
        }
        if outcome.stamp.as_ref().is_some_and(|a| !a.is_none()) {
            self.stamped += 1;
        }
    }
}

/// Every target has to exist before any file is touched.
pub fn validate_targets(targets: &[PathBuf]) -> Result<()> {
    for target in targets {
        if !(target.is_dir() || target.is_file()) {
            return Err(MetadateError::MissingTarget(target.clone()));
        }
    }
    Ok(())
}

pub fn run(targets: &[PathBuf], options: &RunOptions) -> Result<RunSummary> {
    validate_targets(targets)?;

    let mut summary = RunSummary::default();
    for target in targets {
        if target.is_dir() {
            handle_directory(target, options, &mut summary);
        } else if target.is_file() {
            handle_file(target, options, &mut summary);
        }
    }

    info!("{} files processed, {} stamped, {} restored, {} skipped, {} failed",
        summary.processed, summary.stamped, summary.restored, summary.skipped, summary.failed);

    Ok(summary)
}

fn handle_directory(dir: &Path, options: &RunOptions, summary: &mut RunSummary) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to list directory {}: {}", dir.display(), e);
            summary.failed += 1;
            return;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                error!("Failed to list directory {}: {}", dir.display(), e);
                summary.failed += 1;
                continue;
            }
        };

        if path.is_file() {
            handle_file(&path, options, summary);
        } else if path.is_dir() && options.recursive {
            handle_directory(&path, options, summary);
        }
    }
}

pub fn matches_extension(path: &Path, extension: &str) -> bool {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => name.ends_with(extension),
        None => false,
    }
}

fn handle_file(path: &Path, options: &RunOptions, summary: &mut RunSummary) {
    if !matches_extension(path, &options.extension) {
        if options.verbose {
            info!("skipping '{}' (not {})", path.display(), options.extension);
        }
        summary.skipped += 1;
        return;
    }

    match process_file(path, options) {
        Ok(outcome) => summary.add(&outcome),
        Err(e) if e.is_write() => {
            error!("{}", e);
            summary.failed += 1;
        }
        Err(e) => {
            error!("{}", e);
            summary.skipped += 1;
        }
    }
}

/// Runs the reconciler on one file: restore first when reset mode is on,
/// then stamp. Only the stamping failures abort the file.
pub fn process_file(path: &Path, options: &RunOptions) -> Result<FileOutcome> {
    if options.verbose {
        info!("Targeted file: {}", path.display());
    }

    let mut times = FileTimestamps::read(path)?;
    let entry = Entry::from_file(path)?;
    if options.verbose {
        info!("  current mtime: {}", display_epoch(times.modified_epoch()));
    }

    let mut outcome = FileOutcome::default();

    if options.reset_mtimes {
        match reconcile(path, &entry, &times) {
            Ok(action) => {
                if action.is_none() && options.verbose {
                    info!("  mtime already matches the published line, or there is none");
                }
                execute(path, &action, options)?;
                times = action.resulting_times(&times);
                outcome.restore = Some(action);
            }
            Err(e @ MetadateError::MalformedTag { .. }) => {
                warn!("{}. Not restoring its mtime", e);
            }
            Err(e) => return Err(e),
        }
    }

    let action = record(&entry, &times)?;
    if action.is_none() {
        debug!("{} already has a published line", path.display());
    }
    execute(path, &action, options)?;
    outcome.stamp = Some(action);

    Ok(outcome)
}

fn execute(path: &Path, action: &Action, options: &RunOptions) -> Result<()> {
    if let Some(report) = action.report(path, options.dry_run) {
        info!("{}", report);
    }
    if options.dry_run {
        return Ok(());
    }
    apply(path, action)
}
