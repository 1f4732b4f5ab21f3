//! The per-invocation build summary.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// What happened to one requested target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// The target's final artifact was produced at this location.
    Built(PathBuf),
    /// The target's final artifact could not be produced.
    Failed,
}

/// The outcome of one scheduling run.
///
/// Transforms are listed by the name of their first output artifact, each in
/// exactly one of the four buckets. The lists are sorted, so two runs over
/// the same graph with the same outcomes report identically regardless of
/// worker interleaving.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Transforms whose tool was invoked and succeeded.
    pub executed: Vec<String>,
    /// Transforms satisfied from the cache without invocation.
    pub cache_skipped: Vec<String>,
    /// Transforms whose tool was invoked and failed.
    pub failed: Vec<String>,
    /// Transforms never attempted because a dependency failed.
    pub blocked: Vec<String>,
    /// Per-target outcome, by target name.
    pub targets: BTreeMap<String, TargetOutcome>,
}

impl BuildReport {
    /// Returns `true` if every transform completed and every target built.
    pub fn success(&self) -> bool {
        self.failed.is_empty()
            && self.blocked.is_empty()
            && self
                .targets
                .values()
                .all(|t| matches!(t, TargetOutcome::Built(_)))
    }

    /// Total number of transforms accounted for.
    pub fn transform_count(&self) -> usize {
        self.executed.len() + self.cache_skipped.len() + self.failed.len() + self.blocked.len()
    }
}
