//! Core domain types and ports for llpull.
//!
//! This crate holds everything the model-pull pipeline agrees on without
//! touching processes or terminals:
//!
//! - [`ModelIdentifier`] and the [`ResumeMarker`] derived from it
//! - [`ExitOutcome`] and the [`PullReport`] returned by a finished pull
//! - [`PullConfig`] (runner binary, working directory, bar width)
//! - [`PullError`], the error taxonomy shared by runtime and CLI
//! - [`PullReporter`], the port through which progress reaches the operator

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod model;
pub mod outcome;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{
    BAR_WIDTH_ENV, DEFAULT_BAR_WIDTH, DEFAULT_CHUNK_SIZE, DEFAULT_RUNNER, PullConfig, RUNNER_ENV,
    WORK_DIR_ENV,
};
pub use error::{PullError, PullResult};
pub use model::{ModelIdentifier, ResumeMarker};
pub use outcome::{ExitOutcome, PullReport};
pub use ports::{NoopReporter, PullReporter};

// Dev-dependencies used only by integration tests
#[cfg(test)]
use serde_json as _;
