//! File system access used by the tailer.

use std::path::Path;
use std::time::SystemTime;

use async_trait::async_trait;

/// The subset of file metadata the tailer looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// Whether the path is a regular file.
    pub is_file: bool,
    /// Last modification time, if the platform reports one.
    pub modified: Option<SystemTime>,
    /// Size in bytes.
    pub len: u64,
}

/// Where the tailer gets file metadata and content from.
///
/// [`LocalFs`] is the real implementation. Tests wrap it to count reads.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Stat `path`, following symlinks.
    async fn metadata(&self, path: &Path) -> std::io::Result<FileMeta>;

    /// Read the full content of `path`.
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Local file system backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl FileSource for LocalFs {
    async fn metadata(&self, path: &Path) -> std::io::Result<FileMeta> {
        let meta = tokio::fs::metadata(path).await?;
        Ok(FileMeta {
            is_file: meta.is_file(),
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }

    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}
