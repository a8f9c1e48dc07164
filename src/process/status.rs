//! Process lifecycle state.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Lifecycle of the process owned by a runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ProcessState {
    #[default]
    NotStarted,
    Running,
    Stopped,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "Not Started",
            Self::Running => "Running",
            Self::Stopped => "Stopped",
        };
        f.write_str(label)
    }
}

/// Point-in-time snapshot of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessStatus {
    pub state: ProcessState,
    pub pid: Option<u32>,
    /// Time since spawn, frozen once the process stopped.
    pub runtime: Duration,
    /// Exit code, or the negated signal number if killed by a signal.
    pub exit_code: Option<i32>,
}

impl Default for ProcessStatus {
    fn default() -> Self {
        Self {
            state: ProcessState::NotStarted,
            pid: None,
            runtime: Duration::ZERO,
            exit_code: None,
        }
    }
}
