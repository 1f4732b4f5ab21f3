//! Shared foundational types used across the Strata build orchestrator.
//!
//! This crate provides content hashing, transform fingerprints, and
//! interned case-normalized symbol names.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod tool_kind;

pub use hash::{ContentHash, Fingerprint, FingerprintBuilder};
pub use ident::{Ident, Interner};
pub use tool_kind::ToolKind;
