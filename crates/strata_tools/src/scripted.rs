//! An in-memory tool for exercising the scheduler without real compilers.

use crate::tool::{OutputSpec, ProducedOutput, Tool, ToolFailure, ToolInput, ToolOutputs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strata_common::ContentHash;

/// A deterministic scripted tool.
///
/// Writes each requested output as a function of the output name and the
/// bytes of every input, so repeated invocations with identical inputs are
/// reproducible and changed inputs produce changed outputs. Every input
/// must exist on disk; an unreadable input fails the invocation the way a
/// real compiler would. An invocation
/// counter lets tests assert how many times the tool actually ran, and a
/// failure trigger makes a specific input poison the invocation. Clones
/// share the counter, so one scripted tool can back every kind in a toolbox.
#[derive(Clone)]
pub struct ScriptedTool {
    invocations: Arc<AtomicUsize>,
    fail_on: Option<String>,
}

impl ScriptedTool {
    /// Creates a scripted tool that always succeeds.
    pub fn new() -> Self {
        Self {
            invocations: Arc::new(AtomicUsize::new(0)),
            fail_on: None,
        }
    }

    /// Creates a scripted tool that fails whenever an input name contains
    /// the given fragment.
    pub fn failing_on(fragment: impl Into<String>) -> Self {
        Self {
            invocations: Arc::new(AtomicUsize::new(0)),
            fail_on: Some(fragment.into()),
        }
    }

    /// Returns a handle to the invocation counter.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.invocations)
    }
}

impl Default for ScriptedTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ScriptedTool {
    fn invoke(
        &self,
        inputs: &[ToolInput],
        outputs: &[OutputSpec],
    ) -> Result<ToolOutputs, ToolFailure> {
        self.invocations.fetch_add(1, Ordering::SeqCst);

        if let Some(fragment) = &self.fail_on {
            if let Some(poisoned) = inputs.iter().find(|i| i.name.contains(fragment.as_str())) {
                return Err(ToolFailure {
                    message: format!("scripted failure on {}", poisoned.name),
                    stream: format!("{}:1: Error: scripted failure", poisoned.name),
                    location: None,
                });
            }
        }

        let mut payloads = Vec::with_capacity(inputs.len());
        for input in inputs {
            let content = std::fs::read(&input.location).map_err(|e| ToolFailure {
                message: format!("cannot read input {}", input.name),
                stream: format!("{}: {e}", input.location.display()),
                location: None,
            })?;
            payloads.push(content);
        }

        let mut produced = Vec::new();
        for output in outputs {
            let mut bytes = output.name.clone().into_bytes();
            for (input, content) in inputs.iter().zip(&payloads) {
                bytes.extend_from_slice(input.name.as_bytes());
                bytes.extend_from_slice(content);
            }
            if let Some(parent) = output.location.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ToolFailure {
                    message: format!("cannot create output directory for {}", output.name),
                    stream: e.to_string(),
                    location: None,
                })?;
            }
            std::fs::write(&output.location, &bytes).map_err(|e| ToolFailure {
                message: format!("cannot write {}", output.name),
                stream: e.to_string(),
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
