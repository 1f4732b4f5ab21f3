//! The capability-tagged tool table.

use crate::process::ProcessTool;
use crate::tool::Tool;
use std::collections::HashMap;
use strata_common::ToolKind;
use strata_config::ProjectConfig;

/// Maps each [`ToolKind`] to its collaborator.
///
/// Populated from explicit configuration; there is no registry or implicit
/// selection. Tests replace entries with scripted tools.
#[derive(Default)]
pub struct ToolBox {
    tools: HashMap<ToolKind, Box<dyn Tool>>,
}

impl ToolBox {
    /// Creates an empty toolbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a toolbox of process tools from the configured commands.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let mut toolbox = Self::new();
        for (&kind, command) in &config.tools {
            toolbox.insert(kind, Box::new(ProcessTool::new(kind, command)));
        }
        toolbox
    }

    /// Registers (or replaces) the collaborator for a kind.
    pub fn insert(&mut self, kind: ToolKind, tool: Box<dyn Tool>) {
        self.tools.insert(kind, tool);
    }

    /// Returns the collaborator for a kind, if configured.
    pub fn get(&self, kind: ToolKind) -> Option<&dyn Tool> {
        self.tools.get(&kind).map(|t| t.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::load_config_from_str;

    #[test]
    fn from_config_registers_configured_kinds() {
        let config = load_config_from_str(
            "[project]\nname = \"t\"\nversion = \"0.1.0\"\n\n\
             [tools.linker]\ncommand = \"gfortran\"\n\n\
             [targets.t]\nentry = [\"main\"]\n",
        )
        .unwrap();
        let toolbox = ToolBox::from_config(&config);
        assert!(toolbox.get(ToolKind::Linker).is_some());
        assert!(toolbox.get(ToolKind::FortranCompiler).is_none());
    }
}
