//! Tailer error types.

use std::path::PathBuf;

/// Errors that can occur while tailing a file.
#[derive(thiserror::Error, Debug)]
pub enum TailError {
    /// Path does not exist.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Path exists but is a directory or other non-regular entry.
    #[error("Path is not a file: {0}")]
    NotAFile(PathBuf),

    /// I/O failure while inspecting or reading the file.
    #[error("Error reading file {path}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TailError {
    /// Classify an I/O error raised for `path`.
    pub(crate) fn from_io(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::ReadFailure { path, source: err },
        }
    }
}
