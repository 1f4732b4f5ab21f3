//! Tool collaborators: the only boundary through which external programs
//! are invoked.
//!
//! The scheduler sees just the [`Tool`] trait and the capability-tagged
//! [`ToolBox`]; process-backed implementations live here, as does the
//! scripted tool the test suites drive the scheduler with.

#![warn(missing_docs)]

pub mod process;
pub mod scripted;
pub mod tool;
pub mod toolbox;

pub use process::ProcessTool;
pub use scripted::ScriptedTool;
pub use tool::{FailureLocation, OutputSpec, ProducedOutput, Tool, ToolFailure, ToolInput, ToolOutputs};
pub use toolbox::ToolBox;
