//! Per-path tail state owned by the caller.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::source::FileMeta;

/// Cheap change detector: modification time plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub modified: Option<SystemTime>,
    pub size: u64,
}

impl From<&FileMeta> for Fingerprint {
    fn from(meta: &FileMeta) -> Self {
        Self {
            modified: meta.modified,
            size: meta.len,
        }
    }
}

/// Cached view of one file's tail.
///
/// The cached lines match the file as of the stored fingerprint. A changed
/// fingerprint, an empty cache or a different line limit makes the next
/// [`Tailer::read`](super::Tailer::read) go back to disk.
#[derive(Debug, Clone)]
pub struct TailState {
    path: PathBuf,
    fingerprint: Option<Fingerprint>,
    max_lines: Option<i64>,
    lines: Vec<String>,
    total_lines: usize,
    last_error: Option<String>,
}

impl TailState {
    /// Create an empty state for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fingerprint: None,
            max_lines: None,
            lines: Vec::new(),
            total_lines: 0,
            last_error: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines from the last successful read.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Fingerprint recorded at the last read, `None` before the first read
    /// or after [`force_refresh`](Self::force_refresh).
    #[must_use]
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    /// Size in bytes observed at the last read.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.fingerprint.map_or(0, |f| f.size)
    }

    /// Modification time observed at the last read.
    #[must_use]
    pub fn modified(&self) -> Option<SystemTime> {
        self.fingerprint.and_then(|f| f.modified)
    }

    /// Number of lines the file held at the last read.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// 1-based line number of the first cached line.
    #[must_use]
    pub fn first_line_number(&self) -> usize {
        self.total_lines.saturating_sub(self.lines.len()) + 1
    }

    /// Cached lines paired with their real line numbers.
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        let first = self.first_line_number();
        self.lines
            .iter()
            .enumerate()
            .map(move |(i, line)| (first + i, line.as_str()))
    }

    /// Description of the last failure, cleared by the next successful read.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Make the next read go to disk regardless of the fingerprint.
    pub fn force_refresh(&mut self) {
        self.fingerprint = None;
    }

    /// Drop the cached lines. The next read re-reads the file.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.total_lines = 0;
    }

    /// Whether the cache must be refreshed for `current` and `max_lines`.
    pub(crate) fn is_stale(&self, current: Fingerprint, max_lines: i64) -> bool {
        self.fingerprint != Some(current)
            || self.max_lines != Some(max_lines)
            || self.lines.is_empty()
    }

    pub(crate) fn store(
        &mut self,
        fingerprint: Fingerprint,
        max_lines: i64,
        lines: Vec<String>,
        total_lines: usize,
    ) {
        self.fingerprint = Some(fingerprint);
        self.max_lines = Some(max_lines);
        self.lines = lines;
        self.total_lines = total_lines;
        self.last_error = None;
    }

    pub(crate) fn record_error(&mut self, err: &impl std::fmt::Display) {
        self.last_error = Some(err.to_string());
    }

    pub(crate) fn clear_error(&mut self) {
        self.last_error = None;
    }
}
