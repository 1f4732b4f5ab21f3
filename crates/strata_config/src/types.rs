//! Configuration types deserialized from `strata.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use strata_common::ToolKind;

/// The top-level build request parsed from `strata.toml`.
///
/// Contains project metadata, source tree settings, build settings, the
/// tool command table, and the link targets to produce.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Source tree settings (root, skip list, external symbols).
    #[serde(default)]
    pub source: SourceSettings,
    /// Build execution settings (worker count, directories).
    #[serde(default)]
    pub build: BuildSettings,
    /// Commands for each tool kind the build invokes.
    #[serde(default)]
    pub tools: BTreeMap<ToolKind, ToolCommand>,
    /// Named link targets, each rooted at one or more entry symbols.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

impl ProjectConfig {
    /// Returns the command configured for a tool kind, if any.
    pub fn tool(&self, kind: ToolKind) -> Option<&ToolCommand> {
        self.tools.get(&kind)
    }
}

/// Core project metadata required in every `strata.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Source tree settings controlling discovery and resolution.
#[derive(Debug, Deserialize)]
pub struct SourceSettings {
    /// Root directory of the source tree, relative to the project directory.
    #[serde(default = "default_source_root")]
    pub root: PathBuf,
    /// Paths excluded from discovery, relative to the source root.
    #[serde(default, rename = "skip-files")]
    pub skip_files: Vec<PathBuf>,
    /// Symbols satisfied outside the source tree (prebuilt archives,
    /// system libraries). Requirements on these names are not resolution
    /// errors.
    #[serde(default, rename = "external-symbols")]
    pub external_symbols: Vec<String>,
    /// Symbols whose defining files are carried into every target sub-tree
    /// even when nothing reachable requires them.
    #[serde(default, rename = "unreferenced-dependencies")]
    pub unreferenced_dependencies: Vec<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            root: default_source_root(),
            skip_files: Vec::new(),
            external_symbols: Vec::new(),
            unreferenced_dependencies: Vec::new(),
        }
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from("src")
}

/// Build execution settings.
#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    /// Number of worker threads the scheduler runs.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Directory holding the manifest and cached outputs.
    #[serde(default = "default_cache_dir", rename = "cache-dir")]
    pub cache_dir: PathBuf,
    /// Directory where final target outputs are placed.
    #[serde(default = "default_output_dir", rename = "output-dir")]
    pub output_dir: PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            cache_dir: default_cache_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".strata-cache")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build")
}

/// A concrete command binding for one tool kind.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCommand {
    /// The executable to invoke.
    pub command: String,
    /// Flags passed before the per-transform arguments.
    #[serde(default)]
    pub flags: Vec<String>,
}

/// The kind of output a target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// A linked executable.
    Executable,
    /// A static archive.
    Library,
}

/// A named link target rooted at entry symbols.
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    /// Whether this target links an executable or archives a library.
    #[serde(default = "default_target_kind")]
    pub kind: TargetKind,
    /// Entry symbols whose transitive dependency closure forms the target
    /// sub-tree.
    pub entry: Vec<String>,
    /// Prebuilt archives appended to the link line.
    #[serde(default)]
    pub archives: Vec<PathBuf>,
}

fn default_target_kind() -> TargetKind {
    TargetKind::Executable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_settings_defaults() {
        let settings = SourceSettings::default();
        assert_eq!(settings.root, PathBuf::from("src"));
        assert!(settings.skip_files.is_empty());
        assert!(settings.external_symbols.is_empty());
    }

    #[test]
    fn build_settings_defaults() {
        let settings = BuildSettings::default();
        assert!(settings.workers >= 1);
        assert_eq!(settings.cache_dir, PathBuf::from(".strata-cache"));
        assert_eq!(settings.output_dir, PathBuf::from("build"));
    }
}
