//! Reporter port for operator-facing pull output.
//!
//! The runtime decides *what* the operator should see (notices, progress
//! samples, informational lines); adapters decide *how* it is drawn.

/// Receives everything a pull wants to show the operator.
///
/// Implementations must be thread-safe: progress arrives from the output
/// draining task while notices come from the supervising task.
pub trait PullReporter: Send + Sync {
    /// A one-off status message (start, resume, completion).
    fn notice(&self, message: &str);

    /// A progress sample in `0..=100`.
    fn progress(&self, percent: u8);

    /// Progress text whose percentage could not be parsed.
    ///
    /// `text` is the raw text that preceded the `%` marker.
    fn raw_progress(&self, text: &str);

    /// An informational line from the runner output.
    fn line(&self, text: &str);

    /// Called once the output stream is fully drained.
    fn finish(&self);
}

/// A reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl PullReporter for NoopReporter {
    fn notice(&self, _message: &str) {}
    fn progress(&self, _percent: u8) {}
    fn raw_progress(&self, _text: &str) {}
    fn line(&self, _text: &str) {}
    fn finish(&self) {}
}
