//! Tests for tail semantics and error classification.

use std::io::Write;

use tailwatch::tailer::{TailError, TailState, Tailer};
use tempfile::{NamedTempFile, TempDir};

fn numbered_file(count: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for i in 1..=count {
        writeln!(file, "L{i}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn read_keeps_last_lines_in_order() {
    let file = numbered_file(200);
    let mut state = TailState::new(file.path());

    let lines = Tailer::new().read(&mut state, 50).await.unwrap();

    let expected: Vec<String> = (151..=200).map(|i| format!("L{i}")).collect();
    assert_eq!(lines, expected);
    assert_eq!(state.total_lines(), 200);
    assert_eq!(state.first_line_number(), 151);
}

#[tokio::test]
async fn read_short_file_returns_everything() {
    let file = numbered_file(3);
    let mut state = TailState::new(file.path());

    let lines = Tailer::new().read(&mut state, 50).await.unwrap();
    assert_eq!(lines, vec!["L1", "L2", "L3"]);
    assert_eq!(state.first_line_number(), 1);
}

#[tokio::test]
async fn read_missing_path_is_not_found() {
    let dir = TempDir::new().unwrap();
    for name in ["missing.log", "also/missing.txt"] {
        let mut state = TailState::new(dir.path().join(name));
        let result = Tailer::new().read(&mut state, 10).await;
        assert!(matches!(result, Err(TailError::NotFound(_))), "{name}");
    }
}

#[tokio::test]
async fn read_directory_is_not_a_file() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    for path in [dir.path().to_path_buf(), dir.path().join("nested")] {
        let mut state = TailState::new(&path);
        let result = Tailer::new().read(&mut state, 10).await;
        assert!(matches!(result, Err(TailError::NotAFile(_))));
        assert!(state.last_error().is_some());
    }
}

#[tokio::test]
async fn read_preserves_empty_lines_and_strips_terminators() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"alpha\r\n\nbeta\n\n").unwrap();
    file.flush().unwrap();

    let mut state = TailState::new(file.path());
    let lines = Tailer::new().read(&mut state, 10).await.unwrap();
    assert_eq!(lines, vec!["alpha", "", "beta", ""]);
}

#[tokio::test]
async fn read_replaces_invalid_bytes() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"valid\n\xc3\x28 broken\n").unwrap();
    file.flush().unwrap();

    let mut state = TailState::new(file.path());
    let lines = Tailer::new().read(&mut state, 10).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains('\u{FFFD}'));
    assert!(lines[1].ends_with("broken"));
}

#[tokio::test]
async fn read_empty_file_returns_no_lines() {
    let file = NamedTempFile::new().unwrap();
    let mut state = TailState::new(file.path());

    let lines = Tailer::new().read(&mut state, 10).await.unwrap();
    assert!(lines.is_empty());
    assert!(state.last_error().is_none());
}

#[tokio::test]
async fn error_cleared_after_file_appears() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("later.log");
    let tailer = Tailer::new();
    let mut state = TailState::new(&path);

    assert!(tailer.read(&mut state, 10).await.is_err());
    assert!(state.last_error().is_some());

    std::fs::write(&path, "now here\n").unwrap();
    let lines = tailer.read(&mut state, 10).await.unwrap();
    assert_eq!(lines, vec!["now here"]);
    assert!(state.last_error().is_none());
}
