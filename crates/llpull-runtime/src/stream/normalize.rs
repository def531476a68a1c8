//! Chunk normalization.
//!
//! Normalization runs per line, in this order:
//!
//! 1. whitespace runs directly followed by a `|` separator are removed,
//!    together with the separator
//! 2. runs of non-printable bytes (anything outside printable 7-bit ASCII,
//!    including ANSI CSI sequences) are removed
//! 3. surrounding whitespace is trimmed
//! 4. empty results are dropped

use std::sync::LazyLock;

use regex::bytes::Regex;

static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)\s+\|").expect("separator pattern is valid"));

static NON_PRINTABLE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)(?:\x1b\[[0-9;?]*[ -/]*[@-~]|[^\x09\x0A\x0D\x20-\x7E])+")
        .expect("non-printable pattern is valid")
});

/// Split a raw chunk on `\r` and `\n` and normalize each piece.
///
/// Carriage returns are how the runner redraws its progress line, so each
/// redraw in a chunk becomes its own line.
pub fn split_chunk(chunk: &[u8]) -> Vec<String> {
    chunk
        .split(|b| *b == b'\r' || *b == b'\n')
        .filter_map(normalize_line)
        .collect()
}

/// Normalize one line of raw output. Returns `None` if nothing printable
/// remains.
pub fn normalize_line(raw: &[u8]) -> Option<String> {
    let without_separators = SEPARATOR_RUN.replace_all(raw, &b""[..]);
    let printable = NON_PRINTABLE_RUN.replace_all(&without_separators, &b""[..]);

    // Only printable ASCII and whitespace survive the pattern above.
    let text = String::from_utf8_lossy(&printable);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
