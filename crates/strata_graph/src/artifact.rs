//! Artifacts: the nodes of the build graph that hold content.

use std::path::PathBuf;
use strata_common::ContentHash;

/// What an artifact is, which determines how transforms consume it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ArtifactKind {
    /// A source file from the tree, or a prebuilt archive. Always a leaf.
    Source,
    /// Output of a preprocess transform, consumed by a compile.
    PreprocessedSource,
    /// Output of a kernel-generation transform, consumed by a compile.
    GeneratedSource,
    /// An object file produced by a compile, consumed by a link.
    CompiledObject,
    /// A Fortran module interface produced alongside an object, consumed by
    /// dependent compiles.
    ModuleInterface,
    /// The linked executable of a target.
    LinkedExecutable,
    /// The archived library of a target.
    LinkedLibrary,
}

/// A node of the build graph identified by a stable logical name.
///
/// Leaf artifacts carry their content hash from graph construction; produced
/// artifacts get hashes at execution time, tracked by the scheduler.
#[derive(Debug)]
pub struct Artifact {
    /// Stable logical identifier, unique within the graph (e.g.
    /// `obj/atmos/physics.o`).
    pub name: String,
    /// The kind of content this artifact holds.
    pub kind: ArtifactKind,
    /// Where the artifact lives (or will live) on disk.
    pub location: PathBuf,
    /// The content hash, present only for leaves. Hashes of produced
    /// artifacts are execution state, not graph state.
    pub leaf_hash: Option<ContentHash>,
}

impl Artifact {
    /// Returns `true` if this artifact has no producing transform.
    pub fn is_leaf(&self) -> bool {
        self.leaf_hash.is_some()
    }
}
