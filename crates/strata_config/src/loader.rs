//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Loads and validates a `strata.toml` configuration from a project
/// directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join("strata.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `strata.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.targets.is_empty() {
        return Err(ConfigError::MissingField("targets".to_string()));
    }
    for (name, target) in &config.targets {
        if target.entry.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "target '{name}' has no entry symbols"
            )));
        }
    }
    if config.build.workers == 0 {
        return Err(ConfigError::ValidationError(
            "build.workers must be at least 1".to_string(),
        ));
    }
    for (kind, tool) in &config.tools {
        if tool.command.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "tool '{kind}' has an empty command"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetKind;
    use std::path::PathBuf;
    use strata_common::ToolKind;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "atmos"
version = "0.1.0"

[targets.atmos]
entry = ["atmos_main"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "atmos");
        assert_eq!(config.targets["atmos"].entry, vec!["atmos_main"]);
        assert_eq!(config.targets["atmos"].kind, TargetKind::Executable);
        assert_eq!(config.source.root, PathBuf::from("src"));
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "um"
version = "13.0.0"
description = "unified model build"

[source]
root = "source"
skip-files = ["unused/old_physics.f90"]
external-symbols = ["mpi_init", "mpi_finalize"]
unreferenced-dependencies = ["timer_mod"]

[build]
workers = 6
cache-dir = ".cache"
output-dir = "out"

[tools.preprocessor]
command = "cpp"
flags = ["-traditional-cpp", "-P"]

[tools.fortran-compiler]
command = "gfortran"
flags = ["-c", "-O2"]

[tools.c-compiler]
command = "gcc"
flags = ["-c"]

[tools.linker]
command = "gfortran"
flags = ["-fopenmp"]

[targets.um_exec]
kind = "executable"
entry = ["um_main"]
archives = ["prebuilt/libgcom.a"]

[targets.um_lib]
kind = "library"
entry = ["atmos_physics"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.source.skip_files.len(), 1);
        assert_eq!(config.source.external_symbols, vec!["mpi_init", "mpi_finalize"]);
        assert_eq!(config.build.workers, 6);
        let fc = config.tool(ToolKind::FortranCompiler).unwrap();
        assert_eq!(fc.command, "gfortran");
        assert_eq!(fc.flags, vec!["-c", "-O2"]);
        assert_eq!(config.targets["um_lib"].kind, TargetKind::Library);
        assert_eq!(
            config.targets["um_exec"].archives,
            vec![PathBuf::from("prebuilt/libgcom.a")]
        );
    }

    #[test]
    fn missing_name_errors() {
        let toml = r#"
[project]
name = ""
version = "0.1.0"

[targets.t]
entry = ["main"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn no_targets_errors() {
        let toml = r#"
[project]
name = "empty"
version = "0.1.0"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn empty_entry_errors() {
        let toml = r#"
[project]
name = "test"
version = "0.1.0"

[targets.t]
entry = []
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_workers_errors() {
        let toml = r#"
[project]
name = "test"
version = "0.1.0"

[build]
workers = 0

[targets.t]
entry = ["main"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn empty_tool_command_errors() {
        let toml = r#"
[project]
name = "test"
version = "0.1.0"

[tools.linker]
command = ""

[targets.t]
entry = ["main"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("strata.toml"),
            "[project]\nname = \"t\"\nversion = \"0.1.0\"\n\n[targets.t]\nentry = [\"main\"]\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.name, "t");
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
