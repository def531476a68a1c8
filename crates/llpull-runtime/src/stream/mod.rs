//! Runner output interpretation.
//!
//! The runner writes progress redraws, status text and spinner glyphs to
//! both stdout and stderr. This module turns that into operator output:
//!
//! - `reader` - byte-chunk readers merging both pipes into one stream
//! - `normalize` - chunk to printable lines
//! - `parser` - line classification and the drain loop
//!
//! Lines are only split within a chunk. A line cut in half by a read
//! boundary is parsed as two fragments; both are handled without error.

mod normalize;
mod parser;
mod reader;

pub use normalize::{normalize_line, split_chunk};
pub use parser::{DrainStats, INFO_PREFIX, ParsedLine, drain, parse_line};
pub use reader::{CHANNEL_CAPACITY, merge_streams};
