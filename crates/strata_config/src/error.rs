//! Error types for configuration loading and validation.

use strata_common::ToolKind;

/// Errors that can occur when loading or validating a `strata.toml`
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A referenced target name does not exist in the configuration.
    #[error("unknown target '{0}'")]
    UnknownTarget(String),

    /// No command is configured for a tool kind the build needs.
    #[error("no command configured for tool '{0}'")]
    MissingTool(ToolKind),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
