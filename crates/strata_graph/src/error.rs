//! Graph construction errors.

use std::path::PathBuf;
use strata_common::ToolKind;

/// A failure while building the artifact graph. All variants abort the
/// build before any tool is invoked.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The file-level dependencies contain a cycle.
    #[error("dependency cycle: {}", render_cycle(path))]
    Cycle {
        /// The files on the cycle, in order; the first file closes the loop.
        path: Vec<PathBuf>,
    },

    /// A configured entry symbol or unreferenced dependency resolves to no
    /// file.
    #[error("{context}: no file defines symbol '{symbol}'")]
    UnknownSymbol {
        /// The target name, or `unreferenced-dependencies`.
        context: String,
        /// The symbol with no provider.
        symbol: String,
    },

    /// A needed tool kind has no configured command.
    #[error("no command configured for tool '{kind}'")]
    MissingTool {
        /// The unconfigured tool kind.
        kind: ToolKind,
    },

    /// Two transforms would write the same output artifact. Typically a
    /// Fortran and a C file sharing a stem, whose objects collide.
    #[error("artifact '{name}' has more than one producing transform")]
    DuplicateProducer {
        /// The contested artifact name.
        name: String,
    },

    /// A file named by the resolver is not present in the source database.
    #[error("file {} is not loaded", path.display())]
    UnknownFile {
        /// The missing file.
        path: PathBuf,
    },

    /// A prebuilt archive named by a target could not be read for hashing.
    #[error("cannot read prebuilt archive {}: {source}", path.display())]
    ArchiveUnreadable {
        /// The archive path from the target configuration.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

fn render_cycle(path: &[PathBuf]) -> String {
    let mut names: Vec<String> = path.iter().map(|p| p.display().to_string()).collect();
    if let Some(first) = names.first().cloned() {
        names.push(first);
    }
    names.join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_display_closes_loop() {
        let err = GraphError::Cycle {
            path: vec![PathBuf::from("a.f90"), PathBuf::from("b.f90")],
        };
        assert_eq!(format!("{err}"), "dependency cycle: a.f90 -> b.f90 -> a.f90");
    }

    #[test]
    fn unknown_symbol_display() {
        let err = GraphError::UnknownSymbol {
            context: "um_exec".to_string(),
            symbol: "um_main".to_string(),
        };
        assert_eq!(format!("{err}"), "um_exec: no file defines symbol 'um_main'");
    }
}
