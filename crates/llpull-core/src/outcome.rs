//! Exit outcomes and run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Portable result of a finished runner process.
///
/// Produced exactly once per run, after the process has exited and its
/// output has been fully drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "code", rename_all = "snake_case")]
pub enum ExitOutcome {
    /// Exit code 0.
    Success,
    /// Any non-zero exit code, including best-effort codes for signals.
    Failure(i32),
}

impl ExitOutcome {
    /// Map a numeric exit code to an outcome.
    pub const fn from_code(code: i32) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::Failure(code)
        }
    }

    /// Numeric exit code (0 for success).
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure(code) => code,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Summary of a completed pull, suitable for machine-readable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullReport {
    /// Model identifier as passed to the runner.
    pub model: String,
    /// Runner exit code (0 on success).
    pub exit_code: i32,
    /// Whether a non-empty resume marker was present before launch.
    pub resumed: bool,
    /// When the runner was launched.
    pub started_at: DateTime<Utc>,
    /// When the runner exited and its output was drained.
    pub finished_at: DateTime<Utc>,
    /// Non-empty lines drained from the runner output.
    pub lines: u64,
    /// Progress samples extracted from the output.
    pub samples: u64,
    /// Most recent progress sample, if any.
    pub last_sample: Option<u8>,
}

impl PullReport {
    /// Wall-clock duration of the run.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    pub const fn outcome(&self) -> ExitOutcome {
        ExitOutcome::from_code(self.exit_code)
    }
}
