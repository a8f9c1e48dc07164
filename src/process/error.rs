//! Process runner error types.

/// Errors returned by [`ProcessRunner`](super::ProcessRunner).
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    /// A process is already running on this runner.
    #[error("Process already running")]
    AlreadyRunning,

    /// The OS failed to start the command or create its output file.
    #[error("Failed to start process `{command}`: {source}")]
    SpawnFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// No process is running.
    #[error("No process running")]
    NotRunning,

    /// A termination signal could not be delivered.
    #[error("Failed to stop process {pid}: {reason}")]
    StopFailure { pid: u32, reason: String },
}

impl ProcessError {
    pub(crate) fn spawn(command: &str, source: std::io::Error) -> Self {
        Self::SpawnFailure {
            command: command.to_string(),
            source,
        }
    }
}
