//! Transforms: the tool invocations that connect artifacts.

use crate::graph::ArtifactId;
use strata_common::{Fingerprint, ToolKind};

/// One tool invocation in the build graph.
///
/// Transforms are immutable once constructed; the graph is rebuilt from
/// scratch on every invocation, so there is no mutation protocol.
#[derive(Debug)]
pub struct Transform {
    /// The tool kind that realizes this transform.
    pub tool: ToolKind,
    /// Ordered input artifacts. Order is significant: it feeds both the
    /// fingerprint and the tool's command line.
    pub inputs: Vec<ArtifactId>,
    /// The artifacts this transform produces.
    pub outputs: Vec<ArtifactId>,
    /// Digest of the tool's configured command and flags. Folded into the
    /// full fingerprint together with the input hashes.
    pub config_fingerprint: Fingerprint,
}
