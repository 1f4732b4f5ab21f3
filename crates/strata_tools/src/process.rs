//! Tool collaborators backed by external processes.

use crate::tool::{
    FailureLocation, OutputSpec, ProducedOutput, Tool, ToolFailure, ToolInput, ToolOutputs,
};
use std::path::Path;
use std::process::Command;
use strata_common::{ContentHash, ToolKind};
use strata_config::ToolCommand;

/// A tool that spawns a configured command.
///
/// The command-line convention varies by kind: compilers and generators take
/// the primary input and `-o` the primary output; archivers take the output
/// followed by all inputs; linkers take all inputs and `-o` the output.
/// Secondary inputs (module interfaces, headers) are found by the tool via
/// its own search paths and do not appear on the command line. The command
/// must leave every requested output at its requested location.
pub struct ProcessTool {
    kind: ToolKind,
    command: String,
    flags: Vec<String>,
}

impl ProcessTool {
    /// Creates a process tool for a kind from its configured command.
    pub fn new(kind: ToolKind, config: &ToolCommand) -> Self {
        Self {
            kind,
            command: config.command.clone(),
            flags: config.flags.clone(),
        }
    }

    fn build_command(&self, inputs: &[ToolInput], outputs: &[OutputSpec]) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.flags);
        match self.kind {
            ToolKind::Preprocessor
            | ToolKind::FortranCompiler
            | ToolKind::CCompiler
            | ToolKind::KernelGenerator => {
                if let Some(input) = inputs.first() {
                    cmd.arg(&input.location);
                }
                if let Some(output) = outputs.first() {
                    cmd.arg("-o").arg(&output.location);
                }
            }
            ToolKind::Archiver => {
                if let Some(output) = outputs.first() {
                    cmd.arg(&output.location);
                }
                for input in inputs {
                    cmd.arg(&input.location);
                }
            }
            ToolKind::Linker => {
                for input in inputs {
                    cmd.arg(&input.location);
                }
                if let Some(output) = outputs.first() {
                    cmd.arg("-o").arg(&output.location);
                }
            }
        }
        cmd
    }
}

impl Tool for ProcessTool {
    fn invoke(
        &self,
        inputs: &[ToolInput],
        outputs: &[OutputSpec],
    ) -> Result<ToolOutputs, ToolFailure> {
        for output in outputs {
            if let Some(parent) = output.location.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ToolFailure {
                    message: format!("cannot create output directory for {}", output.name),
                    stream: e.to_string(),
                    location: None,
                })?;
            }
        }

        let mut cmd = self.build_command(inputs, outputs);
        let result = cmd.output().map_err(|e| ToolFailure {
            message: format!("cannot spawn '{}'", self.command),
            stream: e.to_string(),
            location: None,
        })?;

        let stream = String::from_utf8_lossy(&result.stderr).into_owned();
        if !result.status.success() {
            return Err(ToolFailure {
                message: format!("{} exited with {}", self.command, result.status),
                location: parse_location(&stream),
                stream,
            });
        }

        let mut produced = Vec::new();
        for output in outputs {
            let bytes = std::fs::read(&output.location).map_err(|_| ToolFailure {
                message: format!(
                    "{} did not produce {}",
                    self.command,
                    output.location.display()
                ),
                stream: stream.clone(),
                location: None,
            })?;
            produced.push(ProducedOutput {
                name: output.name.clone(),
                location: output.location.clone(),
                digest: ContentHash::from_bytes(&bytes),
            });
        }
        Ok(ToolOutputs { outputs: produced })
    }
}

/// Parses a `path:line:` prefix from the first line of a diagnostic stream,
/// the convention of gcc-family tools.
fn parse_location(stream: &str) -> Option<FailureLocation> {
    let line = stream.lines().next()?;
    let mut parts = line.splitn(3, ':');
    let path = parts.next()?;
    let line_no: u32 = parts.next()?.trim().parse().ok()?;
    if path.is_empty() || Path::new(path).extension().is_none() {
        return None;
    }
    Some(FailureLocation {
        path: path.into(),
        line: line_no,
    })
}
