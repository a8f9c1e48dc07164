//! Tail the last lines of a file, re-reading only when it changed.
//!
//! The caller owns one [`TailState`] per monitored path and decides when to
//! call [`Tailer::read`]. There is no polling loop in here.

mod error;
mod reader;
mod source;
mod state;
mod stats;

pub use error::TailError;
pub use reader::Tailer;
pub use source::{FileMeta, FileSource, LocalFs};
pub use state::{Fingerprint, TailState};
pub use stats::TailStats;
