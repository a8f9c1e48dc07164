//! Fingerprint-gated tail reader.

use super::error::TailError;
use super::source::{FileSource, LocalFs};
use super::state::{Fingerprint, TailState};

/// Reads the last lines of a file into a caller-owned [`TailState`].
///
/// The file is only read when its modification time or size moved since
/// the last call, when the line limit changed, or when the cache is empty.
#[derive(Debug, Clone, Default)]
pub struct Tailer<S = LocalFs> {
    source: S,
}

impl Tailer<LocalFs> {
    /// Create a tailer over the local file system.
    #[must_use]
    pub fn new() -> Self {
        Self { source: LocalFs }
    }
}

impl<S: FileSource> Tailer<S> {
    /// Create a tailer over a custom file source.
    #[must_use]
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Get the underlying file source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return at most the last `max_lines` lines of the file at
    /// `state.path()`.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD. Line terminators are stripped
    /// and empty lines are kept. A non-positive `max_lines` yields no lines.
    /// Failures are also recorded in [`TailState::last_error`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist ([`TailError::NotFound`])
    /// - The path is not a regular file ([`TailError::NotAFile`])
    /// - Metadata or content cannot be read ([`TailError::ReadFailure`])
    pub async fn read(
        &self,
        state: &mut TailState,
        max_lines: i64,
    ) -> Result<Vec<String>, TailError> {
        match self.refresh(state, max_lines).await {
            Ok(lines) => Ok(lines),
            Err(err) => {
                state.record_error(&err);
                Err(err)
            }
        }
    }

    async fn refresh(
        &self,
        state: &mut TailState,
        max_lines: i64,
    ) -> Result<Vec<String>, TailError> {
        let path = state.path().to_path_buf();

        let meta = self
            .source
            .metadata(&path)
            .await
            .map_err(|e| TailError::from_io(path.clone(), e))?;

        if !meta.is_file {
            return Err(TailError::NotAFile(path));
        }

        let limit = usize::try_from(max_lines).unwrap_or(0);
        if limit == 0 {
            state.clear_error();
            return Ok(Vec::new());
        }

        let current = Fingerprint::from(&meta);
        if !state.is_stale(current, max_lines) {
            tracing::trace!(path = %path.display(), "File unchanged, using cached lines");
            return Ok(state.lines().to_vec());
        }

        let bytes = self
            .source
            .read(&path)
            .await
            .map_err(|e| TailError::from_io(path.clone(), e))?;

        let (lines, total_lines) = tail_lines(&bytes, limit);
        tracing::debug!(
            path = %path.display(),
            size = current.size,
            total_lines,
            kept = lines.len(),
            "Re-read file"
        );

        state.store(current, max_lines, lines, total_lines);
        Ok(state.lines().to_vec())
    }
}

/// Decode `bytes` leniently and keep the last `limit` lines.
///
/// Returns the kept lines and the total line count.
fn tail_lines(bytes: &[u8], limit: usize) -> (Vec<String>, usize) {
    let text = String::from_utf8_lossy(bytes);
    let all = split_lines(&text);
    let total = all.len();
    let start = total.saturating_sub(limit);
    let kept = all[start..].iter().map(|line| (*line).to_string()).collect();
    (kept, total)
}

/// Split on `\n`, `\r\n` or a lone `\r`, dropping the terminators.
///
/// A final terminator does not start another (empty) line.
fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}
