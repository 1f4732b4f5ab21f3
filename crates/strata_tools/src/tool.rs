//! The tool collaborator interface.

use std::path::PathBuf;
use strata_common::ContentHash;

/// One input artifact handed to a tool: its stable name and where it lives.
#[derive(Debug, Clone)]
pub struct ToolInput {
    /// The artifact's logical name.
    pub name: String,
    /// The artifact's on-disk location.
    pub location: PathBuf,
}

/// One output a tool is asked to produce.
#[derive(Debug, Clone)]
pub struct OutputSpec {
    /// The artifact's logical name.
    pub name: String,
    /// Where the tool must write it.
    pub location: PathBuf,
}

/// One output a tool actually produced, with its content digest.
#[derive(Debug, Clone)]
pub struct ProducedOutput {
    /// The artifact's logical name.
    pub name: String,
    /// Where it was written.
    pub location: PathBuf,
    /// Digest of the written bytes.
    pub digest: ContentHash,
}

/// Everything a successful invocation produced.
#[derive(Debug, Clone)]
pub struct ToolOutputs {
    /// The produced outputs, one per requested [`OutputSpec`].
    pub outputs: Vec<ProducedOutput>,
}

/// A source location a tool attributed a failure to, when derivable from
/// its diagnostic stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureLocation {
    /// The file the tool named.
    pub path: PathBuf,
    /// The 1-indexed line.
    pub line: u32,
}

/// A failed tool invocation.
///
/// Carries the tool's diagnostic stream so the build report can show the
/// compiler output verbatim.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ToolFailure {
    /// A one-line summary of the failure.
    pub message: String,
    /// The tool's raw diagnostic stream (stderr-equivalent).
    pub stream: String,
    /// A source location parsed from the stream, if any.
    pub location: Option<FailureLocation>,
}

/// A tool collaborator realizing one transform kind.
///
/// Implementations are selected by explicit configuration through the
/// toolbox; the scheduler only knows this contract.
pub trait Tool: Send + Sync {
    /// Invokes the tool on ordered inputs, producing the requested outputs.
    fn invoke(&self, inputs: &[ToolInput], outputs: &[OutputSpec])
        -> Result<ToolOutputs, ToolFailure>;
}
