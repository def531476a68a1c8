//! `llpull` command-line interface.
//!
//! Parses arguments, wires configuration and logging, and hands the pull
//! to [`llpull_runtime::download_model`]. Everything the operator sees on
//! stdout comes from the reporter; diagnostics go to stderr.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary entry point.
use anyhow as _;
use dotenvy as _;

pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;

pub use commands::Commands;
pub use error::CliError;
pub use logging::init_tracing;
pub use parser::Cli;
