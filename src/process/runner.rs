//! Spawn, supervise and stop a single child process.
//!
//! The child's stdout and stderr share one temp file. A background task owns
//! the child, reaps it, and publishes its exit code on a watch channel.
//! Both that task and [`ProcessRunner::stop`] go through
//! [`Lifecycle::finish`], so the Running to Stopped transition happens once.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tempfile::TempPath;
use tokio::process::Child;
use tokio::sync::{oneshot, watch};

use super::command::CommandSpec;
use super::error::ProcessError;
use super::status::{ProcessState, ProcessStatus};
use crate::config::ProcessConfig;

/// How long a process gets to exit after SIGTERM before it is killed.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Lifecycle {
    state: ProcessState,
    pid: Option<u32>,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
    exit_code: Option<i32>,
}

impl Lifecycle {
    fn start(&mut self, pid: Option<u32>) {
        *self = Self {
            state: ProcessState::Running,
            pid,
            started_at: Some(Instant::now()),
            ..Self::default()
        };
    }

    /// Move Running to Stopped. Returns false if already stopped.
    fn finish(&mut self, exit_code: i32) -> bool {
        if self.state != ProcessState::Running {
            return false;
        }
        self.state = ProcessState::Stopped;
        self.exit_code = Some(exit_code);
        self.stopped_at = Some(Instant::now());
        true
    }

    fn snapshot(&self) -> ProcessStatus {
        let runtime = match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => stop.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        };
        ProcessStatus {
            state: self.state,
            pid: self.pid,
            runtime,
            exit_code: self.exit_code,
        }
    }
}

fn lock(lifecycle: &Mutex<Lifecycle>) -> MutexGuard<'_, Lifecycle> {
    lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Channels to the background task that owns the child.
#[derive(Debug)]
struct Supervision {
    exit_rx: watch::Receiver<Option<i32>>,
    kill_tx: Option<oneshot::Sender<()>>,
}

impl Supervision {
    fn request_kill(&mut self) {
        if let Some(kill_tx) = self.kill_tx.take() {
            let _ = kill_tx.send(());
        }
    }
}

/// Runs one command at a time with its output captured to a temp file.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct ProcessRunner {
    lifecycle: Arc<Mutex<Lifecycle>>,
    supervision: Option<Supervision>,
    output: Option<TempPath>,
    grace_period: Duration,
    output_prefix: String,
    output_suffix: String,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    /// Create a runner with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&ProcessConfig::default())
    }

    /// Create a runner from a process configuration.
    #[must_use]
    pub fn with_config(config: &ProcessConfig) -> Self {
        Self {
            lifecycle: Arc::new(Mutex::new(Lifecycle::default())),
            supervision: None,
            output: None,
            grace_period: config.grace_period(),
            output_prefix: config.output_prefix.clone(),
            output_suffix: config.output_suffix.clone(),
        }
    }

    /// Override the SIGTERM grace period.
    #[must_use]
    pub fn grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Spawn `command`, through the shell if `shell` is set.
    ///
    /// # Errors
    ///
    /// See [`spawn_spec`](Self::spawn_spec).
    pub fn spawn(&mut self, command: &str, shell: bool) -> Result<ProcessStatus, ProcessError> {
        self.spawn_spec(&CommandSpec::new(command).shell(shell))
    }

    /// Spawn the command described by `spec`.
    ///
    /// Any output file left from a previous run is removed and a new one is
    /// created. Stdout and stderr both write to it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A process is still running ([`ProcessError::AlreadyRunning`])
    /// - The command is blank, the output file cannot be created, or the OS
    ///   fails to start the command ([`ProcessError::SpawnFailure`])
    pub fn spawn_spec(&mut self, spec: &CommandSpec) -> Result<ProcessStatus, ProcessError> {
        if self.is_running() {
            return Err(ProcessError::AlreadyRunning);
        }

        let mut cmd = spec.to_command().ok_or_else(|| {
            ProcessError::spawn(
                spec.command(),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            )
        })?;

        self.supervision = None;
        self.discard_output();

        let (stdout, output) = tempfile::Builder::new()
            .prefix(&self.output_prefix)
            .suffix(&self.output_suffix)
            .tempfile()
            .map_err(|e| ProcessError::spawn(spec.command(), e))?
            .into_parts();
        let stderr = stdout
            .try_clone()
            .map_err(|e| ProcessError::spawn(spec.command(), e))?;

        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true);
        // Own group, so signals reach everything a shell command forks.
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd
            .spawn()
            .map_err(|e| ProcessError::spawn(spec.command(), e))?;
        let pid = child.id();

        lock(&self.lifecycle).start(pid);

        let (exit_tx, exit_rx) = watch::channel(None);
        let (kill_tx, kill_rx) = oneshot::channel();
        tokio::spawn(watch_child(
            child,
            kill_rx,
            exit_tx,
            Arc::clone(&self.lifecycle),
        ));

        tracing::info!(
            pid,
            command = %spec.command(),
            output = %output.display(),
            "Process started"
        );

        self.supervision = Some(Supervision {
            exit_rx,
            kill_tx: Some(kill_tx),
        });
        self.output = Some(output);

        Ok(self.status())
    }

    /// Stop the running process.
    ///
    /// Sends SIGTERM to the process group, waits up to the grace period for
    /// the spawned process to exit, then sends SIGKILL to the group and waits.
    /// Returns the recorded exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No process is running ([`ProcessError::NotRunning`])
    /// - SIGTERM cannot be delivered ([`ProcessError::StopFailure`])
    pub async fn stop(&mut self) -> Result<i32, ProcessError> {
        let pid = {
            let lifecycle = lock(&self.lifecycle);
            if lifecycle.state != ProcessState::Running {
                return Err(ProcessError::NotRunning);
            }
            lifecycle.pid
        };
        let supervision = self
            .supervision
            .as_mut()
            .ok_or(ProcessError::NotRunning)?;
        let mut exit_rx = supervision.exit_rx.clone();

        tracing::info!(pid, "Stopping process");
        if !send_terminate(pid)? {
            supervision.request_kill();
        }

        let exit_code =
            match tokio::time::timeout(self.grace_period, wait_for_exit(&mut exit_rx)).await {
                Ok(exit_code) => exit_code,
                Err(_) => {
                    tracing::warn!(
                        pid,
                        grace_ms = u64::try_from(self.grace_period.as_millis()).unwrap_or(u64::MAX),
                        "Process ignored SIGTERM, killing"
                    );
                    kill_group(pid);
                    supervision.request_kill();
                    wait_for_exit(&mut exit_rx).await
                }
            };

        let exit_code = exit_code.ok_or_else(|| ProcessError::StopFailure {
            pid: pid.unwrap_or_default(),
            reason: "exit watcher ended without a status".to_string(),
        })?;

        if lock(&self.lifecycle).finish(exit_code) {
            tracing::info!(pid, exit_code, "Process stopped");
        }
        Ok(exit_code)
    }

    /// Current state, pid, runtime and exit code.
    #[must_use]
    pub fn status(&self) -> ProcessStatus {
        lock(&self.lifecycle).snapshot()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.lifecycle).state == ProcessState::Running
    }

    /// Path of the file receiving the process output, until cleanup.
    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Stop the process if running, then delete the output file.
    ///
    /// Failure to delete the file is logged and ignored. Calling this again
    /// does nothing.
    pub async fn cleanup(&mut self) {
        if self.is_running() {
            if let Err(e) = self.stop().await {
                tracing::warn!(error = %e, "Stop during cleanup failed, killing");
                kill_group(self.status().pid);
                if let Some(supervision) = self.supervision.as_mut() {
                    supervision.request_kill();
                }
            }
        }
        self.discard_output();
    }

    fn discard_output(&mut self) {
        let Some(output) = self.output.take() else {
            return;
        };
        let path = output.to_path_buf();
        match output.close() {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed output file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove output file"
            ),
        }
    }
}

impl Drop for ProcessRunner {
    fn drop(&mut self) {
        let Some(supervision) = self.supervision.as_mut() else {
            return;
        };
        let status = lock(&self.lifecycle).snapshot();
        if status.state == ProcessState::Running {
            kill_group(status.pid);
        }
        supervision.request_kill();
    }
}

/// Own the child until it exits, then record and publish its exit code.
async fn watch_child(
    mut child: Child,
    kill_rx: oneshot::Receiver<()>,
    exit_tx: watch::Sender<Option<i32>>,
    lifecycle: Arc<Mutex<Lifecycle>>,
) {
    let pid = child.id();

    let status = tokio::select! {
        status = child.wait() => status,
        Ok(()) = kill_rx => {
            if let Err(e) = child.start_kill() {
                tracing::warn!(pid, error = %e, "Failed to kill process");
            }
            child.wait().await
        }
    };

    let exit_code = match status {
        Ok(status) => exit_code_of(status),
        Err(e) => {
            tracing::warn!(pid, error = %e, "Failed to wait for process");
            -1
        }
    };

    if lock(&lifecycle).finish(exit_code) {
        tracing::info!(pid, exit_code, "Process exited");
    }
    let _ = exit_tx.send(Some(exit_code));
}

async fn wait_for_exit(exit_rx: &mut watch::Receiver<Option<i32>>) -> Option<i32> {
    exit_rx
        .wait_for(Option::is_some)
        .await
        .ok()
        .and_then(|exit_code| *exit_code)
}

/// Send SIGTERM to the process group led by `pid`. Returns false where
/// there is no graceful signal and the caller should kill instead.
#[cfg(unix)]
fn send_terminate(pid: Option<u32>) -> Result<bool, ProcessError> {
    use nix::sys::signal::Signal;

    // Already reaped.
    let Some(pid) = pid else {
        return Ok(true);
    };
    signal_group(pid, Signal::SIGTERM)
        .map(|()| true)
        .map_err(|reason| ProcessError::StopFailure { pid, reason })
}

#[cfg(not(unix))]
fn send_terminate(_pid: Option<u32>) -> Result<bool, ProcessError> {
    Ok(false)
}

/// SIGKILL the whole group. The waiter only kills the direct child.
#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    use nix::sys::signal::Signal;

    if let Some(pid) = pid {
        if let Err(reason) = signal_group(pid, Signal::SIGKILL) {
            tracing::warn!(pid, reason = %reason, "Failed to kill process group");
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

/// Signal the group led by `pid`. An empty group counts as success.
#[cfg(unix)]
fn signal_group(pid: u32, signal: nix::sys::signal::Signal) -> Result<(), String> {
    use nix::errno::Errno;
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| "pid out of range".to_string())?;
    match killpg(Pid::from_raw(raw), signal) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

/// Exit code, or the negated signal number for a signal-terminated process.
fn exit_code_of(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    status.code().unwrap_or(-1)
}
