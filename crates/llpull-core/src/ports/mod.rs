//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the pull pipeline expects from its adapters.
//! They contain no terminal or process details.

pub mod reporter;

pub use reporter::{NoopReporter, PullReporter};
