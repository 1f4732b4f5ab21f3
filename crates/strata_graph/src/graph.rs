//! The bipartite artifact/transform DAG.

use crate::artifact::Artifact;
use crate::transform::Transform;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};
use strata_common::{ContentHash, Fingerprint, FingerprintBuilder};

/// Identifies an [`Artifact`] node in a [`BuildGraph`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ArtifactId(pub(crate) NodeIndex);

/// Identifies a [`Transform`] node in a [`BuildGraph`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TransformId(pub(crate) NodeIndex);

#[derive(Debug)]
pub(crate) enum Node {
    Artifact(Artifact),
    Transform(Transform),
}

/// The immutable build graph: artifacts and transforms in a bipartite DAG.
///
/// Edges run from input artifacts to transforms and from transforms to
/// their output artifacts. Construction guarantees acyclicity; the scheduler
/// walks the graph without further validation.
#[derive(Debug)]
pub struct BuildGraph {
    pub(crate) graph: DiGraph<Node, ()>,
    pub(crate) targets: BTreeMap<String, ArtifactId>,
}

impl BuildGraph {
    /// Returns the artifact with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not refer to an artifact of this graph.
    pub fn artifact(&self, id: ArtifactId) -> &Artifact {
        match &self.graph[id.0] {
            Node::Artifact(a) => a,
            Node::Transform(_) => panic!("id refers to a transform"),
        }
    }

    /// Returns the transform with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not refer to a transform of this graph.
    pub fn transform(&self, id: TransformId) -> &Transform {
        match &self.graph[id.0] {
            Node::Transform(t) => t,
            Node::Artifact(_) => panic!("id refers to an artifact"),
        }
    }

    /// Iterates over all transform ids.
    pub fn transform_ids(&self) -> impl Iterator<Item = TransformId> + '_ {
        self.graph.node_indices().filter_map(|idx| match &self.graph[idx] {
            Node::Transform(_) => Some(TransformId(idx)),
            Node::Artifact(_) => None,
        })
    }

    /// Iterates over all artifact ids.
    pub fn artifact_ids(&self) -> impl Iterator<Item = ArtifactId> + '_ {
        self.graph.node_indices().filter_map(|idx| match &self.graph[idx] {
            Node::Artifact(_) => Some(ArtifactId(idx)),
            Node::Transform(_) => None,
        })
    }

    /// Returns the transform producing an artifact, or `None` for leaves.
    pub fn producer(&self, id: ArtifactId) -> Option<TransformId> {
        self.graph
            .neighbors_directed(id.0, Direction::Incoming)
            .next()
            .map(TransformId)
    }

    /// Returns the transforms consuming an artifact.
    pub fn consumers(&self, id: ArtifactId) -> Vec<TransformId> {
        self.graph
            .neighbors_directed(id.0, Direction::Outgoing)
            .map(TransformId)
            .collect()
    }

    /// The final output artifact of each requested target, by target name.
    pub fn targets(&self) -> &BTreeMap<String, ArtifactId> {
        &self.targets
    }

    /// Returns the number of transforms in the graph.
    pub fn transform_count(&self) -> usize {
        self.transform_ids().count()
    }

    /// Content hashes of every leaf artifact, seeding the scheduler's
    /// produced-hash state.
    pub fn leaf_hashes(&self) -> HashMap<ArtifactId, ContentHash> {
        self.artifact_ids()
            .filter_map(|id| self.artifact(id).leaf_hash.map(|h| (id, h)))
            .collect()
    }

    /// Computes a transform's fingerprint from the current artifact hashes.
    ///
    /// Folds the tool kind, the tool configuration digest, and each ordered
    /// input's name and content hash. Returns `None` while any input hash is
    /// still unknown; the scheduler only fingerprints ready transforms, whose
    /// inputs are all produced.
    pub fn fingerprint(
        &self,
        id: TransformId,
        hashes: &HashMap<ArtifactId, ContentHash>,
    ) -> Option<Fingerprint> {
        let transform = self.transform(id);
        let mut builder = FingerprintBuilder::new();
        builder.fold_str(&transform.tool.to_string());
        builder.fold_bytes(transform.config_fingerprint.as_bytes());
        for &input in &transform.inputs {
            let hash = hashes.get(&input)?;
            builder.fold_str(&self.artifact(input).name);
            builder.fold_hash(hash);
        }
        Some(builder.finish())
    }
}
