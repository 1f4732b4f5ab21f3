//! Source kind classification driving extraction and transform expansion.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The kind of a source file, derived from its file extension.
///
/// The kind selects which unit extractor runs on the file and which chain of
/// transforms the graph builder expands it into: `.F90` sources get a
/// preprocess step before compilation, kernel-generation sources expand into
/// a generation step feeding a compile step, headers and include files never
/// compile on their own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SourceKind {
    /// Free-form Fortran (`.f90`), compiled directly.
    FortranFree,
    /// Free-form Fortran requiring preprocessing first (`.F90`).
    FortranPreprocess,
    /// C source (`.c`).
    C,
    /// C header (`.h`), satisfied by inclusion, never compiled.
    CHeader,
    /// Fortran include fragment (`.inc`), satisfied by inclusion.
    FortranInclude,
    /// Kernel-generation source (`.x90`): a generation step produces the
    /// compilable algorithm/kernel pair.
    KernelGen,
}

impl SourceKind {
    /// Classifies a path by extension, returning `None` for files the
    /// orchestrator does not handle.
    ///
    /// Extension matching is case-sensitive: `.F90` and `.f90` are distinct
    /// kinds because only the former carries preprocessor directives.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "f90" => Some(SourceKind::FortranFree),
            "F90" => Some(SourceKind::FortranPreprocess),
            "c" => Some(SourceKind::C),
            "h" => Some(SourceKind::CHeader),
            "inc" => Some(SourceKind::FortranInclude),
            "x90" => Some(SourceKind::KernelGen),
            _ => None,
        }
    }

    /// Returns `true` for kinds that produce a compiled object.
    pub fn is_compiled(self) -> bool {
        !matches!(self, SourceKind::CHeader | SourceKind::FortranInclude)
    }

    /// Returns `true` for kinds that need a preprocess transform before the
    /// compile transform.
    pub fn needs_preprocess(self) -> bool {
        matches!(self, SourceKind::FortranPreprocess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn classify_by_extension() {
        let cases = [
            ("a.f90", Some(SourceKind::FortranFree)),
            ("a.F90", Some(SourceKind::FortranPreprocess)),
            ("a.c", Some(SourceKind::C)),
            ("a.h", Some(SourceKind::CHeader)),
            ("a.inc", Some(SourceKind::FortranInclude)),
            ("a.x90", Some(SourceKind::KernelGen)),
            ("a.txt", None),
            ("no_extension", None),
        ];
        for (path, expected) in cases {
            assert_eq!(SourceKind::from_path(&PathBuf::from(path)), expected);
        }
    }

    #[test]
    fn headers_and_includes_not_compiled() {
        assert!(!SourceKind::CHeader.is_compiled());
        assert!(!SourceKind::FortranInclude.is_compiled());
        assert!(SourceKind::FortranFree.is_compiled());
        assert!(SourceKind::KernelGen.is_compiled());
    }

    #[test]
    fn only_upper_f90_preprocessed() {
        assert!(SourceKind::FortranPreprocess.needs_preprocess());
        assert!(!SourceKind::FortranFree.needs_preprocess());
        assert!(!SourceKind::C.needs_preprocess());
    }
}
