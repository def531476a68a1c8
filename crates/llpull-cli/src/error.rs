//! CLI error type and its mapping to process exit codes.

use llpull_core::PullError;
use thiserror::Error;

/// Exit code after an interrupt, as shells report SIGINT.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid or missing arguments.
    #[error("{0}")]
    Usage(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The runner could not be started or supervised.
    #[error("{0}")]
    Process(String),

    /// The runner ran and exited with a failure code.
    #[error("failed to pull model, exit code: {code}")]
    RunnerFailed { code: i32 },

    /// Interrupted by the operator.
    #[error("pull cancelled")]
    Cancelled,

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to a process exit code.
    ///
    /// - 2: usage error
    /// - 71: could not start or wait for the runner (`EX_OSERR`)
    /// - 74: output error (`EX_IOERR`)
    /// - 78: configuration error (`EX_CONFIG`)
    /// - 130: cancelled
    /// - otherwise the runner's own exit code, or 1 when it does not fit
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 2,
            Self::Config(_) => 78,
            Self::Process(_) => 71,
            Self::RunnerFailed { code } => u8::try_from(*code)
                .ok()
                .filter(|c| *c != 0)
                .unwrap_or(1),
            Self::Cancelled => INTERRUPTED_EXIT_CODE,
            Self::Io(_) => 74,
        }
    }
}

impl From<PullError> for CliError {
    fn from(err: PullError) -> Self {
        match err {
            PullError::InvalidModel => Self::Usage(err.to_string()),
            PullError::LaunchFailed { .. }
            | PullError::MissingStream(_)
            | PullError::WaitFailed(_) => Self::Process(err.to_string()),
            PullError::NonZeroExit { code } => Self::RunnerFailed { code },
            PullError::Cancelled => Self::Cancelled,
            PullError::Config(msg) => Self::Config(msg),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
