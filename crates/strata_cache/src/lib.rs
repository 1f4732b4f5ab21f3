//! The build cache: the only state shared between build invocations.
//!
//! Keyed by transform fingerprint, verified against on-disk bytes at lookup
//! time, and persisted as `manifest.json` in the cache directory with a
//! fail-safe loader.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod manifest;

pub use cache::{entry_from_outputs, BuildCache, Lookup};
pub use error::CacheError;
pub use manifest::{CacheEntry, CacheManifest, CachedOutput};
