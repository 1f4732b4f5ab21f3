//! The build cache: fingerprint-keyed lookup with on-disk verification.

use crate::error::CacheError;
use crate::manifest::{CacheEntry, CacheManifest, CachedOutput};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use strata_common::{ContentHash, Fingerprint};

/// The outcome of a verified cache lookup.
#[derive(Debug)]
pub enum Lookup<'a> {
    /// The entry exists and every recorded output still matches its digest.
    Hit(&'a CacheEntry),
    /// No entry for this fingerprint.
    Miss,
    /// An entry exists but an output is missing or its bytes changed on
    /// disk. Treated as a miss; the caller surfaces an integrity warning.
    Stale {
        /// The output artifact that failed verification.
        output: String,
        /// Its recorded location.
        location: PathBuf,
    },
}

/// The build cache over a cache directory.
///
/// Opening never fails: an absent, corrupt, or version-incompatible manifest
/// simply yields an empty cache and a full rebuild.
pub struct BuildCache {
    manifest: CacheManifest,
    cache_dir: PathBuf,
    version: String,
}

impl BuildCache {
    /// Opens the cache in `cache_dir` for the given version.
    pub fn open(cache_dir: &Path, version: &str) -> Self {
        let manifest = CacheManifest::load(cache_dir)
            .filter(|m| m.is_compatible(version))
            .unwrap_or_else(|| CacheManifest::new(version));
        Self {
            manifest,
            cache_dir: cache_dir.to_path_buf(),
            version: version.to_string(),
        }
    }

    /// Looks up a fingerprint, verifying each recorded output against its
    /// on-disk bytes.
    pub fn lookup(&self, fingerprint: Fingerprint) -> Lookup<'_> {
        let Some(entry) = self.manifest.entries.get(&fingerprint.to_string()) else {
            return Lookup::Miss;
        };
        for (name, output) in &entry.outputs {
            let verified = std::fs::read(&output.location)
                .map(|bytes| ContentHash::from_bytes(&bytes) == output.digest)
                .unwrap_or(false);
            if !verified {
                return Lookup::Stale {
                    output: name.clone(),
                    location: output.location.clone(),
                };
            }
        }
        Lookup::Hit(entry)
    }

    /// Records a successful transform execution.
    ///
    /// Recording the same fingerprint with identical outputs is a no-op.
    /// Recording it with different outputs is a reproducibility error: the
    /// original entry is kept and the discrepancy is surfaced.
    pub fn record(
        &mut self,
        fingerprint: Fingerprint,
        entry: CacheEntry,
    ) -> Result<(), CacheError> {
        let key = fingerprint.to_string();
        if let Some(existing) = self.manifest.entries.get(&key) {
            if *existing != entry {
                return Err(CacheError::Reproducibility { fingerprint });
            }
            return Ok(());
        }
        self.manifest.entries.insert(key, entry);
        Ok(())
    }

    /// Removes every entry whose fingerprint is not in the live set.
    /// Returns the number of entries removed.
    pub fn prune(&mut self, live: &HashSet<Fingerprint>) -> usize {
        let live_keys: HashSet<String> = live.iter().map(|fp| fp.to_string()).collect();
        let before = self.manifest.entries.len();
        self.manifest.entries.retain(|key, _| live_keys.contains(key));
        before - self.manifest.entries.len()
    }

    /// Persists the manifest to the cache directory.
    pub fn persist(&self) -> Result<(), CacheError> {
        self.manifest.save(&self.cache_dir)
    }

    /// Returns the number of recorded entries.
    pub fn len(&self) -> usize {
        self.manifest.entries.len()
    }

    /// Returns `true` if the cache has no entries.
    pub fn is_empty(&self) -> bool {
        self.manifest.entries.is_empty()
    }

    /// The version string this cache was opened with.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Builds a [`CacheEntry`] from produced outputs.
pub fn entry_from_outputs<I>(outputs: I) -> CacheEntry
where
    I: IntoIterator<Item = (String, ContentHash, PathBuf)>,
{
    let mut entry = CacheEntry::default();
    for (name, digest, location) in outputs {
        entry.outputs.insert(name, CachedOutput { digest, location });
    }
    entry
}
