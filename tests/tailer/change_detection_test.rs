//! Tests for fingerprint-gated re-reads, using a source that counts reads.

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tailwatch::tailer::{FileMeta, FileSource, LocalFs, TailState, Tailer};
use tempfile::NamedTempFile;

/// Local file system that counts content reads.
#[derive(Debug, Clone, Default)]
struct CountingFs {
    reads: Arc<AtomicUsize>,
}

impl CountingFs {
    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileSource for CountingFs {
    async fn metadata(&self, path: &Path) -> std::io::Result<FileMeta> {
        LocalFs.metadata(path).await
    }

    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        LocalFs.read(path).await
    }
}

fn file_with(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn unchanged_file_is_read_once() {
    let file = file_with("one\ntwo\n");
    let tailer = Tailer::with_source(CountingFs::default());
    let mut state = TailState::new(file.path());

    let first = tailer.read(&mut state, 10).await.unwrap();
    let second = tailer.read(&mut state, 10).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(tailer.source().reads(), 1);
}

#[tokio::test]
async fn appended_content_is_detected() {
    let mut file = file_with("one\n");
    let tailer = Tailer::with_source(CountingFs::default());
    let mut state = TailState::new(file.path());

    assert_eq!(tailer.read(&mut state, 10).await.unwrap(), vec!["one"]);

    writeln!(file, "two").unwrap();
    file.flush().unwrap();

    assert_eq!(tailer.read(&mut state, 10).await.unwrap(), vec!["one", "two"]);
    assert_eq!(tailer.source().reads(), 2);
}

#[tokio::test]
async fn same_size_rewrite_detected_by_mtime() {
    let file = file_with("aaaa\n");
    let tailer = Tailer::with_source(CountingFs::default());
    let mut state = TailState::new(file.path());
    tailer.read(&mut state, 10).await.unwrap();

    std::fs::write(file.path(), "bbbb\n").unwrap();
    let later = SystemTime::now() + Duration::from_secs(10);
    std::fs::File::options()
        .write(true)
        .open(file.path())
        .unwrap()
        .set_modified(later)
        .unwrap();

    assert_eq!(tailer.read(&mut state, 10).await.unwrap(), vec!["bbbb"]);
    assert_eq!(tailer.source().reads(), 2);
}

#[tokio::test]
async fn force_refresh_rereads_unchanged_file() {
    let file = file_with("same\n");
    let tailer = Tailer::with_source(CountingFs::default());
    let mut state = TailState::new(file.path());

    tailer.read(&mut state, 10).await.unwrap();
    state.force_refresh();
    tailer.read(&mut state, 10).await.unwrap();

    assert_eq!(tailer.source().reads(), 2);
}

#[tokio::test]
async fn clear_triggers_reread() {
    let file = file_with("same\n");
    let tailer = Tailer::with_source(CountingFs::default());
    let mut state = TailState::new(file.path());

    tailer.read(&mut state, 10).await.unwrap();
    state.clear();
    assert!(state.lines().is_empty());

    assert_eq!(tailer.read(&mut state, 10).await.unwrap(), vec!["same"]);
    assert_eq!(tailer.source().reads(), 2);
}

#[tokio::test]
async fn changed_limit_rereads() {
    let file = file_with("a\nb\nc\n");
    let tailer = Tailer::with_source(CountingFs::default());
    let mut state = TailState::new(file.path());

    assert_eq!(tailer.read(&mut state, 1).await.unwrap(), vec!["c"]);
    assert_eq!(tailer.read(&mut state, 2).await.unwrap(), vec!["b", "c"]);
    assert_eq!(tailer.source().reads(), 2);
}

#[tokio::test]
async fn empty_file_is_checked_every_time() {
    let file = NamedTempFile::new().unwrap();
    let tailer = Tailer::with_source(CountingFs::default());
    let mut state = TailState::new(file.path());

    tailer.read(&mut state, 10).await.unwrap();
    tailer.read(&mut state, 10).await.unwrap();

    assert_eq!(tailer.source().reads(), 2);
}

#[tokio::test]
async fn non_positive_limit_skips_content_read() {
    let file = file_with("content\n");
    let tailer = Tailer::with_source(CountingFs::default());
    let mut state = TailState::new(file.path());

    assert!(tailer.read(&mut state, 0).await.unwrap().is_empty());
    assert!(tailer.read(&mut state, -1).await.unwrap().is_empty());
    assert_eq!(tailer.source().reads(), 0);
}
