//! Diagnostic codes with category prefixes for structured identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Error diagnostics, prefixed with `E`.
    Error,
    /// Warning diagnostics, prefixed with `W`.
    Warning,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric
/// identifier, displayed as e.g. `E101` or `W501`.
///
/// Number ranges follow the error taxonomy: 1xx extraction, 2xx resolution,
/// 3xx graph construction, 4xx tool invocation, 5xx cache.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Malformed source that could not be lexed for named units.
    pub const EXTRACTION: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);
    /// Two files define the same named unit.
    pub const DUPLICATE_DEFINITION: DiagnosticCode = DiagnosticCode::new(Category::Error, 201);
    /// A required named unit has no defining file.
    pub const UNRESOLVED_DEPENDENCY: DiagnosticCode = DiagnosticCode::new(Category::Error, 202);
    /// The dependency graph contains a cycle.
    pub const GRAPH_CYCLE: DiagnosticCode = DiagnosticCode::new(Category::Error, 301);
    /// A tool collaborator reported failure.
    pub const TOOL_FAILURE: DiagnosticCode = DiagnosticCode::new(Category::Error, 401);
    /// A transform was skipped because an upstream transform failed.
    pub const BLOCKED: DiagnosticCode = DiagnosticCode::new(Category::Error, 402);
    /// A tool produced different output for an unchanged fingerprint.
    pub const REPRODUCIBILITY: DiagnosticCode = DiagnosticCode::new(Category::Error, 403);
    /// A cached output was missing or did not match its recorded digest.
    pub const CACHE_INTEGRITY: DiagnosticCode = DiagnosticCode::new(Category::Warning, 501);

    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", DiagnosticCode::EXTRACTION), "E101");
        assert_eq!(format!("{}", DiagnosticCode::CACHE_INTEGRITY), "W501");
        assert_eq!(
            format!("{}", DiagnosticCode::new(Category::Warning, 3)),
            "W003"
        );
    }

    #[test]
    fn taxonomy_categories() {
        assert_eq!(DiagnosticCode::GRAPH_CYCLE.category, Category::Error);
        assert_eq!(DiagnosticCode::CACHE_INTEGRITY.category, Category::Warning);
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::TOOL_FAILURE;
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
