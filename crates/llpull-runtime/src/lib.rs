//! Runner process supervision and output interpretation for llpull.
//!
//! # Structure
//!
//! - [`detect`] - advisory check for an interrupted previous download
//! - [`runner`] - runner binary resolution and the fixed invocation
//! - [`stream`] - combined output reading, normalization and classification
//! - [`render`] - text progress bar
//! - [`console`] - terminal implementation of [`PullReporter`](llpull_core::PullReporter)
//! - [`supervisor`] - launch, concurrent drain, wait, join and exit decoding
//! - [`shutdown`] - SIGTERM then SIGKILL for cancelled runs
//! - [`pull`] - the `download_model` facade
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use llpull_core::PullConfig;
//! use llpull_runtime::{ConsoleReporter, PullOptions, download_model};
//!
//! # async fn example() -> Result<(), llpull_core::PullError> {
//! let config = PullConfig::from_env()?;
//! let reporter = Arc::new(ConsoleReporter::new(config.bar_width));
//! let report = download_model("gemma3:1b", &config, PullOptions::default(), reporter).await?;
//! println!("pulled {} in {}s", report.model, report.duration().num_seconds());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod console;
pub mod detect;
pub mod pull;
pub mod render;
pub mod runner;
pub mod shutdown;
pub mod stream;
pub mod supervisor;

pub use console::ConsoleReporter;
pub use detect::detect_partial_download;
pub use pull::{PullOptions, download_model};
pub use render::render_bar;
pub use runner::{
    GPU_LAYERS, RunnerError, RunnerInvocation, RunnerResult, SMOKE_TEST_PROMPT, resolve_runner,
};
pub use shutdown::shutdown_child;
pub use stream::{DrainStats, ParsedLine, drain, merge_streams, normalize_line, parse_line};
pub use supervisor::{SupervisedExit, Supervisor, UNKNOWN_EXIT_CODE, exit_code_from_status};
