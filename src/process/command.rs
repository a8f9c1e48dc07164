//! Command construction for the process runner.

use std::path::PathBuf;

use tokio::process::Command;

/// What to run and how.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    command: String,
    shell: bool,
    working_dir: Option<PathBuf>,
}

impl CommandSpec {
    /// Create a spec that runs `command` through the system shell.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            shell: true,
            working_dir: None,
        }
    }

    /// Run through the shell (`sh -c`) or split on whitespace and exec directly.
    #[must_use]
    pub fn shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    /// Set the working directory for the process.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    #[must_use]
    pub fn is_shell(&self) -> bool {
        self.shell
    }

    #[must_use]
    pub fn get_working_dir(&self) -> Option<&PathBuf> {
        self.working_dir.as_ref()
    }

    /// Program and arguments to exec, or `None` for a blank command.
    #[must_use]
    pub fn program_and_args(&self) -> Option<(String, Vec<String>)> {
        if self.command.trim().is_empty() {
            return None;
        }

        if self.shell {
            let (shell, flag) = if cfg!(windows) {
                ("cmd", "/C")
            } else {
                ("sh", "-c")
            };
            return Some((
                shell.to_string(),
                vec![flag.to_string(), self.command.clone()],
            ));
        }

        let mut parts = self.command.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some((program, parts.collect()))
    }

    /// Build the tokio command. Stdio is left to the caller.
    pub(crate) fn to_command(&self) -> Option<Command> {
        let (program, args) = self.program_and_args()?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }
        Some(cmd)
    }
}
