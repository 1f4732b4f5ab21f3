//! The capability tags identifying external tool collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of external tool a transform invokes.
///
/// Tools are selected by explicit configuration: the build request maps each
/// kind to a concrete command, and the graph builder tags every transform
/// with the kind it needs. There is no implicit registry or subclass
/// dispatch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    /// Source preprocessor (e.g. cpp run over `.F90` files).
    Preprocessor,
    /// Fortran compiler producing objects and module interfaces.
    FortranCompiler,
    /// C compiler producing objects.
    CCompiler,
    /// Kernel code generator turning a kernel-gen source into compilable
    /// Fortran (algorithm plus generated kernel pair).
    KernelGenerator,
    /// Static archiver combining objects into a library.
    Archiver,
    /// Linker producing the final executable.
    Linker,
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolKind::Preprocessor => "preprocessor",
            ToolKind::FortranCompiler => "fortran-compiler",
            ToolKind::CCompiler => "c-compiler",
            ToolKind::KernelGenerator => "kernel-generator",
            ToolKind::Archiver => "archiver",
            ToolKind::Linker => "linker",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_name() {
        let json = serde_json::to_string(&ToolKind::FortranCompiler).unwrap();
        assert_eq!(json, "\"fortran-compiler\"");
        assert_eq!(format!("{}", ToolKind::FortranCompiler), "fortran-compiler");
    }

    #[test]
    fn orderable_for_map_keys() {
        assert!(ToolKind::Preprocessor < ToolKind::Linker);
    }
}
