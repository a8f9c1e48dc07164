//! Summary numbers over a set of tailed lines.

use serde::Serialize;

/// Line and character counts for displayed output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TailStats {
    pub lines: usize,
    pub total_chars: usize,
    pub avg_line_length: f64,
}

impl TailStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_lines(lines: &[String]) -> Self {
        let total_chars: usize = lines.iter().map(|l| l.chars().count()).sum();
        let avg_line_length = if lines.is_empty() {
            0.0
        } else {
            total_chars as f64 / lines.len() as f64
        };
        Self {
            lines: lines.len(),
            total_chars,
            avg_line_length,
        }
    }
}
