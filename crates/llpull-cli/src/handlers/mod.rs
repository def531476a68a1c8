//! Command handlers.
//!
//! Each handler validates CLI-specific input, calls into the runtime and
//! formats the result for the terminal.

pub mod pull;
