//! Line classification and the drain loop.

use std::sync::Arc;

use llpull_core::PullReporter;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::normalize::split_chunk;

/// Prefix printed before informational lines.
pub const INFO_PREFIX: &str = "> ";

/// Classification of one normalized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// A percentage in `0..=100`.
    Progress(u8),
    /// A `%` line whose percentage did not parse; holds the text before `%`.
    RawProgress(String),
    /// Anything without a `%`.
    Info(String),
}

/// Classify a normalized line.
///
/// A line is progress iff it contains `%`. The text before the first `%`
/// must hold at least two whitespace-separated tokens (status text, then
/// the number); the candidate percentage is the last of them. Integers
/// outside `0..=100` are clamped. A `%` line without a status prefix, such
/// as `42%` or a lone `%`, yields `None` and is not shown.
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let Some((before, _)) = line.split_once('%') else {
        return Some(ParsedLine::Info(line.to_string()));
    };

    let before = before.trim();
    let mut tokens = before.split_whitespace();
    let candidate = tokens.next_back()?;
    tokens.next_back()?;

    match candidate.parse::<i64>() {
        Ok(value) => {
            let clamped = value.clamp(0, 100);
            Some(ParsedLine::Progress(u8::try_from(clamped).unwrap_or(100)))
        }
        Err(_) => Some(ParsedLine::RawProgress(before.to_string())),
    }
}

/// Counters collected while draining runner output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Raw chunks received.
    pub chunks: u64,
    /// Non-empty normalized lines.
    pub lines: u64,
    /// Lines that produced a progress sample.
    pub samples: u64,
    /// Most recent progress sample.
    pub last_sample: Option<u8>,
}

impl DrainStats {
    fn record(&mut self, parsed: Option<&ParsedLine>) {
        self.lines += 1;
        if let Some(ParsedLine::Progress(p)) = parsed {
            self.samples += 1;
            self.last_sample = Some(*p);
        }
    }
}

/// Drain the merged output stream until every pipe has closed.
///
/// Each chunk is normalized and every resulting line is forwarded to the
/// reporter exactly once. Returns when the channel closes, which is the
/// end-of-stream signal the supervisor joins on.
pub async fn drain(mut chunks: mpsc::Receiver<Vec<u8>>, reporter: Arc<dyn PullReporter>) -> DrainStats {
    let mut stats = DrainStats::default();

    while let Some(chunk) = chunks.recv().await {
        stats.chunks += 1;
        trace!(len = chunk.len(), "runner output chunk");

        for line in split_chunk(&chunk) {
            let parsed = parse_line(&line);
            stats.record(parsed.as_ref());
            match parsed {
                Some(parsed) => dispatch(&parsed, reporter.as_ref()),
                None => trace!(%line, "percent line without status text"),
            }
        }
    }

    debug!(
        chunks = stats.chunks,
        lines = stats.lines,
        samples = stats.samples,
        "runner output drained"
    );
    stats
}

fn dispatch(parsed: &ParsedLine, reporter: &dyn PullReporter) {
    match parsed {
        ParsedLine::Progress(percent) => reporter.progress(*percent),
        ParsedLine::RawProgress(text) => reporter.raw_progress(text),
        ParsedLine::Info(text) => reporter.line(text),
    }
}
