//! Process runner integration tests.


use std::time::{Duration, Instant};

use tailwatch::process::{ProcessRunner, ProcessState};
use tailwatch::tailer::{TailState, Tailer};

/// Poll until the runner leaves Running, or panic after `limit`.
pub async fn wait_until_stopped(runner: &ProcessRunner, limit: Duration) {
    let start = Instant::now();
    while runner.status().state == ProcessState::Running {
        assert!(start.elapsed() < limit, "process still running after {limit:?}");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Poll the runner's output file until some line equals `needle`.
pub async fn wait_for_line(runner: &ProcessRunner, needle: &str, limit: Duration) {
    let path = runner.output_path().expect("output file").to_path_buf();
    let tailer = Tailer::new();
    let mut state = TailState::new(path);
    let start = Instant::now();
    loop {
        if let Ok(lines) = tailer.read(&mut state, 100).await {
            if lines.iter().any(|l| l == needle) {
                return;
            }
        }
        assert!(start.elapsed() < limit, "never saw {needle:?} in output");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Verify the public process types are exported from the library.
#[test]
fn test_all_process_types_exported() {
    use tailwatch::process::{CommandSpec, ProcessError, ProcessStatus, DEFAULT_GRACE_PERIOD};

    let _ = CommandSpec::new("true");
    let _ = ProcessStatus::default();
    let _: fn() -> ProcessError = || ProcessError::NotRunning;
    assert_eq!(DEFAULT_GRACE_PERIOD, Duration::from_secs(5));
}
