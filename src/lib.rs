//! Tailwatch - follow the tail of a file and the output of a supervised process.
//!
//! The two halves are independent: [`tailer`] reads the last lines of a file
//! when it changes, and [`process`] runs a command with its output captured
//! to a temp file. A host wires them together by tailing
//! [`process::ProcessRunner::output_path`].

pub mod config;
pub mod display;
pub mod process;
pub mod tailer;
