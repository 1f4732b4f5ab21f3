//! The artifact graph: turns resolved file dependencies into an immutable
//! bipartite DAG of artifacts and tool transforms, pruned to the configured
//! targets.
//!
//! Leaf artifacts are hashed here; transform fingerprints are computed
//! lazily at scheduling time, once the hashes of all inputs are known.

#![warn(missing_docs)]

pub mod artifact;
pub mod builder;
pub mod error;
pub mod graph;
pub mod transform;

pub use artifact::{Artifact, ArtifactKind};
pub use builder::build_graph;
pub use error::GraphError;
pub use graph::{ArtifactId, BuildGraph, TransformId};
pub use transform::Transform;
