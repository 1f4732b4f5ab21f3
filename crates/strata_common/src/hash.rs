//! Content hashing and transform fingerprints for staleness detection.
//!
//! Two hash types flow through the build graph. A [`ContentHash`] is the
//! digest of an artifact's actual bytes, either the source text of a leaf or
//! the bytes a tool produced. A [`Fingerprint`] is the composite digest of a
//! transform's ordered input hashes plus its tool configuration, and is the
//! key used to decide whether the transform needs to run at all.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit content hash computed using XXH3.
///
/// Two artifacts with the same `ContentHash` are assumed to have identical
/// bytes. Leaf artifacts are hashed at graph construction; produced artifacts
/// are hashed after their transform executes, and those hashes feed the
/// fingerprints of downstream transforms.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// The cache key of a single transform.
///
/// A fingerprint is derived from everything that can change a transform's
/// output: the tool kind, the tool's configuration string, and the ordered
/// identities and content hashes of its inputs. Because input hashes are
/// themselves derived from upstream fingerprinted transforms, any upstream
/// change transitively produces a new fingerprint downstream.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Reconstructs a fingerprint from raw digest bytes (used by the cache
    /// manifest deserializer and tests).
    pub fn from_raw(raw: [u8; 16]) -> Self {
        Self(raw)
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Parses a fingerprint from its 32-character hex form.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != 32 {
            return None;
        }
        let mut raw = [0u8; 16];
        for (i, byte) in raw.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(raw))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// Incremental builder folding heterogeneous values into a [`Fingerprint`].
///
/// Each `fold_*` call appends a length-prefixed field to the digest input, so
/// `["ab", "c"]` and `["a", "bc"]` produce different fingerprints.
#[derive(Default)]
pub struct FingerprintBuilder {
    buf: Vec<u8>,
}

impl FingerprintBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a string field into the fingerprint.
    pub fn fold_str(&mut self, s: &str) -> &mut Self {
        self.fold_bytes(s.as_bytes())
    }

    /// Folds a raw byte field into the fingerprint.
    pub fn fold_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf
            .extend_from_slice(&(bytes.len() as u64).to_le_bytes());
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Folds a content hash into the fingerprint.
    pub fn fold_hash(&mut self, hash: &ContentHash) -> &mut Self {
        self.fold_bytes(hash.as_bytes())
    }

    /// Finishes the builder, producing the fingerprint.
    pub fn finish(&self) -> Fingerprint {
        let digest = xxhash_rust::xxh3::xxh3_128(&self.buf);
        Fingerprint(digest.to_le_bytes())
    }
}
