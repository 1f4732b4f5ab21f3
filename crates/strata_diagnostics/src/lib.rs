//! Structured diagnostics for the Strata build orchestrator.
//!
//! Extraction errors, resolution failures, tool output, and cache integrity
//! warnings all flow through [`Diagnostic`] values collected in a
//! thread-safe [`DiagnosticSink`] and rendered at the end of a stage.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
