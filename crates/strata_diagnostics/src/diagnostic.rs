//! Structured diagnostic messages with severity, codes, and notes.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use strata_source::Span;

/// A structured diagnostic message with an optional source location.
///
/// Diagnostics are the primary mechanism for reporting problems to the user:
/// extraction and resolution errors, graph cycles, tool failures, and cache
/// integrity warnings. Tool diagnostics additionally carry the tool's raw
/// output stream as notes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The primary source span, or [`Span::DUMMY`] when the problem has no
    /// source location (e.g. a link failure).
    pub primary_span: Span,
    /// Explanatory footnotes, including captured tool output.
    pub notes: Vec<String>,
    /// Actionable suggestions.
    pub help: Vec<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given code, message, and span.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            primary_span: span,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic with the given code, message, and span.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            primary_span: span,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_error() {
        let diag = Diagnostic::error(
            DiagnosticCode::UNRESOLVED_DEPENDENCY,
            "no file defines 'ocean_mod'",
            Span::DUMMY,
        );
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(format!("{}", diag.code), "E202");
    }

    #[test]
    fn create_warning() {
        let diag = Diagnostic::warning(
            DiagnosticCode::CACHE_INTEGRITY,
            "cached output missing",
            Span::DUMMY,
        );
        assert_eq!(diag.severity, Severity::Warning);
    }

    #[test]
    fn builder_methods() {
        let diag = Diagnostic::error(DiagnosticCode::TOOL_FAILURE, "compiler failed", Span::DUMMY)
            .with_note("Error: undefined reference")
            .with_help("check the linker flags");
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
    }
}
