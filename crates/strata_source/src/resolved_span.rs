//! Human-readable source locations for rendered diagnostics.

use std::fmt;
use std::path::PathBuf;

/// A span resolved to file path and 1-indexed line/column coordinates.
///
/// Produced by [`SourceDb::resolve_span`](crate::SourceDb::resolve_span) for
/// diagnostic rendering; the raw [`Span`](crate::Span) only stores byte
/// offsets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSpan {
    /// The path of the file containing the span.
    pub file_path: PathBuf,
    /// 1-indexed line of the span start.
    pub start_line: u32,
    /// 1-indexed column of the span start.
    pub start_col: u32,
    /// 1-indexed line of the span end.
    pub end_line: u32,
    /// 1-indexed column of the span end.
    pub end_col: u32,
}

impl fmt::Display for ResolvedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file_path.display(),
            self.start_line,
            self.start_col
        )
    }
}
