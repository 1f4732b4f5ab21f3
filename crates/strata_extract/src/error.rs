//! Extraction error type tied to a file and line.

use std::path::PathBuf;

/// A failure to extract named units from one source file.
///
/// Extraction errors do not abort extraction of other files; they are
/// collected and reported together.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}:{line}: {reason}", path.display())]
pub struct ExtractionError {
    /// The file that failed to extract.
    pub path: PathBuf,
    /// The 1-indexed line where the problem was detected.
    pub line: u32,
    /// What went wrong.
    pub reason: String,
}

impl ExtractionError {
    /// Creates a new extraction error.
    pub fn new(path: PathBuf, line: u32, reason: impl Into<String>) -> Self {
        Self {
            path,
            line,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let err = ExtractionError::new(
            PathBuf::from("src/physics.f90"),
            12,
            "use statement with no module name",
        );
        assert_eq!(
            format!("{err}"),
            "src/physics.f90:12: use statement with no module name"
        );
    }
}
