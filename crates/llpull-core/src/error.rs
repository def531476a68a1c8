//! Error types for model pulls.
//!
//! One enum covers the whole lifecycle so that adapters can map each
//! failure class to their own surface (exit codes, JSON, messages).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while pulling a model through the runner.
#[derive(Debug, Error)]
pub enum PullError {
    /// The model identifier was empty. Nothing was launched.
    #[error("model identifier is required")]
    InvalidModel,

    /// The runner binary could not be found or spawned.
    #[error("failed to start {}: {source}", .runner.display())]
    LaunchFailed {
        runner: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The spawned process did not expose a piped output stream.
    #[error("runner process has no {0} pipe")]
    MissingStream(&'static str),

    /// Waiting on the runner process failed.
    #[error("failed to wait for runner process: {0}")]
    WaitFailed(#[source] io::Error),

    /// The runner exited normally with a failure code.
    #[error("failed to pull model, exit code: {code}")]
    NonZeroExit { code: i32 },

    /// The pull was cancelled before the runner finished.
    #[error("model pull cancelled")]
    Cancelled,

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PullError {
    /// Exit code reported by the runner, if the runner actually ran to exit.
    ///
    /// Launch and wait failures carry no exit code.
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { code } => Some(*code),
            _ => None,
        }
    }

    /// Create a `Config` error from any displayable value.
    pub fn config(msg: impl std::fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }
}

/// Result type alias for pull operations.
pub type PullResult<T> = Result<T, PullError>;
