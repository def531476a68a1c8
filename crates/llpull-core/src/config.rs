//! Pull configuration.
//!
//! The runner invocation itself is fixed; what can be configured is which
//! binary is executed, where it runs, and how progress is drawn.
//!
//! Resolution order for every field: explicit builder call, environment
//! variable, built-in default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PullError;
use crate::model::{ModelIdentifier, ResumeMarker};

/// Runner binary used when nothing else is configured.
pub const DEFAULT_RUNNER: &str = "llama-run";

/// Width of the progress bar in characters.
pub const DEFAULT_BAR_WIDTH: usize = 30;

/// Size of each raw read from the runner output.
pub const DEFAULT_CHUNK_SIZE: usize = 2048;

/// Overrides the runner binary.
pub const RUNNER_ENV: &str = "LLPULL_RUNNER";

/// Overrides the working directory of the runner.
pub const WORK_DIR_ENV: &str = "LLPULL_WORK_DIR";

/// Overrides the progress bar width.
pub const BAR_WIDTH_ENV: &str = "LLPULL_BAR_WIDTH";

/// Configuration for a single pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullConfig {
    /// Runner binary (bare name or path).
    pub runner: PathBuf,
    /// Directory the runner executes in; `None` inherits the current one.
    pub work_dir: Option<PathBuf>,
    /// Progress bar width in characters.
    pub bar_width: usize,
    /// Read buffer size for the runner output.
    pub chunk_size: usize,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            runner: PathBuf::from(DEFAULT_RUNNER),
            work_dir: None,
            bar_width: DEFAULT_BAR_WIDTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl PullConfig {
    /// Build a config from the process environment.
    pub fn from_env() -> Result<Self, PullError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PullError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(runner) = get(RUNNER_ENV) {
            debug!(runner = %runner, "runner overridden from environment");
            config.runner = PathBuf::from(runner);
        }

        if let Some(dir) = get(WORK_DIR_ENV) {
            debug!(work_dir = %dir, "working directory overridden from environment");
            config.work_dir = Some(PathBuf::from(dir));
        }

        if let Some(width) = get(BAR_WIDTH_ENV) {
            config.bar_width = width.trim().parse().map_err(|e| {
                PullError::config(format!("{BAR_WIDTH_ENV}={width:?} is not a valid width: {e}"))
            })?;
        }

        Ok(config)
    }

    /// Set the runner binary.
    #[must_use]
    pub fn with_runner(mut self, runner: impl Into<PathBuf>) -> Self {
        self.runner = runner.into();
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Set the progress bar width.
    #[must_use]
    pub const fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width;
        self
    }

    /// Resume marker for `model` under the configured working directory.
    pub fn resume_marker(&self, model: &ModelIdentifier) -> ResumeMarker {
        ResumeMarker::for_model(model, self.work_dir.as_deref())
    }

    /// Working directory, if one was configured.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }
}
