//! Supervised child process with output redirected to a temp file.
//!
//! [`ProcessRunner`] spawns one command at a time, merges its stdout and
//! stderr into a fresh temp file, and tracks its lifecycle. Feed
//! [`ProcessRunner::output_path`] to a [`Tailer`](crate::tailer::Tailer) to
//! follow the output.

mod command;
mod error;
mod runner;
mod status;

pub use command::CommandSpec;
pub use error::ProcessError;
pub use runner::{ProcessRunner, DEFAULT_GRACE_PERIOD};
pub use status::{ProcessState, ProcessStatus};
