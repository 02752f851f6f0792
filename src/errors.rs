use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetadateError>;

#[derive(Debug, Error)]
pub enum MetadateError {
    #[error("Failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed published line in {path}: {line}")]
    MalformedTag { path: PathBuf, line: String },

    #[error("Failed to write file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Timestamp {0} cannot be represented as a local date time")]
    InvalidTimestamp(i64),

    #[error("No such file or directory: {0}")]
    MissingTarget(PathBuf),

    #[error("{0}")]
    Config(String),
}

impl MetadateError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read { path: path.into(), source }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write { path: path.into(), source }
    }

    /// Mutation failures are the only ones that change the exit status.
    pub fn is_write(&self) -> bool {
        matches!(self, MetadateError::Write { .. })
    }
}
