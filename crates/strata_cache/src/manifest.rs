//! The on-disk cache manifest.
//!
//! Stored as `manifest.json` in the cache directory: one entry per transform
//! fingerprint, mapping each output artifact to its content digest and
//! on-disk location. This is the only state that survives between runs.

use crate::error::CacheError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use strata_common::ContentHash;

/// Name of the manifest file within the cache directory.
const MANIFEST_FILE: &str = "manifest.json";

/// One recorded output of a cached transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedOutput {
    /// Digest of the output bytes at record time.
    pub digest: ContentHash,
    /// Where the output was written.
    pub location: PathBuf,
}

/// The recorded outputs of one transform execution, keyed by artifact name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Output artifact name to digest and location.
    pub outputs: BTreeMap<String, CachedOutput>,
}

/// The persisted cache manifest.
///
/// Fingerprints are stored in hex form so the JSON stays diffable; ordered
/// maps keep repeated saves byte-identical for an unchanged cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Strata version that produced this cache. Invalidate on change.
    pub strata_version: String,
    /// Entries keyed by fingerprint hex.
    pub entries: BTreeMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Creates a new, empty manifest for the given version.
    pub fn new(version: &str) -> Self {
        Self {
            strata_version: version.to_string(),
            entries: BTreeMap::new(),
        }
    }

    /// Loads the manifest from the cache directory, returning `None` if the
    /// file doesn't exist or can't be parsed.
    ///
    /// This is fail-safe: any error results in `None` and a fresh cache.
    pub fn load(cache_dir: &Path) -> Option<Self> {
        let path = cache_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Saves the manifest to the cache directory, creating it if needed.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(|e| CacheError::Io {
            path: cache_dir.to_path_buf(),
            source: e,
        })?;
        let path = cache_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Returns `true` if this manifest was produced by a compatible version.
    pub fn is_compatible(&self, current_version: &str) -> bool {
        self.strata_version == current_version
    }
}
