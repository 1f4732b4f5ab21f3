//! Cache error types.

use std::path::PathBuf;
use strata_common::Fingerprint;

/// Errors from cache persistence and recording.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error while reading or writing cache state.
    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest could not be serialized.
    #[error("cache serialization error: {reason}")]
    Serialization {
        /// What went wrong.
        reason: String,
    },

    /// A transform produced different output bytes for a fingerprint that
    /// already has a recorded entry. The recorded entry is kept; the build
    /// surfaces the discrepancy instead of silently overwriting.
    #[error("non-reproducible transform: fingerprint {fingerprint} already recorded with different outputs")]
    Reproducibility {
        /// The fingerprint with conflicting outputs.
        fingerprint: Fingerprint,
    },
}
