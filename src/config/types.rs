//! Configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Defaults for tailing a file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TailConfig {
    /// Number of trailing lines to keep.
    pub max_lines: i64,
    /// Seconds between re-reads when following a file.
    pub refresh_interval_secs: f64,
    /// Prefix each line with its line number.
    pub show_line_numbers: bool,
}

impl TailConfig {
    /// Refresh interval as a duration, never shorter than 100ms.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.refresh_interval_secs)
            .unwrap_or(Duration::ZERO)
            .max(Duration::from_millis(100))
    }
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            max_lines: 100,
            refresh_interval_secs: 2.0,
            show_line_numbers: true,
        }
    }
}

/// Defaults for spawning a supervised process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessConfig {
    /// Seconds between SIGTERM and SIGKILL.
    pub grace_period_secs: u64,
    /// Run commands through the system shell.
    pub shell: bool,
    /// File name prefix of the output file.
    pub output_prefix: String,
    /// File name suffix of the output file.
    pub output_suffix: String,
}

impl ProcessConfig {
    #[must_use]
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 5,
            shell: true,
            output_prefix: "process_output_".to_string(),
            output_suffix: ".log".to_string(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TailwatchConfig {
    pub tail: TailConfig,
    pub process: ProcessConfig,
}
