//! Build request configuration for the Strata build orchestrator.
//!
//! Parses and validates `strata.toml`: project metadata, link targets,
//! tool commands, and source tree settings.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::{
    BuildSettings, ProjectConfig, ProjectMeta, SourceSettings, TargetConfig, TargetKind,
    ToolCommand,
};
