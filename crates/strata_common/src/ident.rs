//! Interned symbol names for cheap cloning and O(1) equality comparison.
//!
//! Fortran is case-insensitive, so symbol names are folded to lowercase
//! before interning; `MODULE Physics` and `use physics` intern to the same
//! [`Ident`].

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A unique identifier for a named unit (module, procedure, kernel, header).
///
/// Identifiers are interned strings represented as a `u32` index into a
/// shared string interner, giving O(1) equality and O(1) cloning.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw `u32` index.
    ///
    /// Primarily intended for deserialization and testing. In normal use,
    /// identifiers are created through [`Interner::intern_symbol`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32` which is always a valid `usize` on 32-bit and
// 64-bit platforms. `try_from_usize` rejects values that don't fit in `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner backed by [`lasso::ThreadedRodeo`].
///
/// All named units are interned here so that the resolver compares symbols by
/// index rather than by string, across extraction threads.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a symbol name, folding it to lowercase first.
    ///
    /// This is the normal entry point for names extracted from source text:
    /// Fortran names are case-insensitive so all casings of a name map to
    /// one identifier.
    pub fn intern_symbol(&self, name: &str) -> Ident {
        if name.chars().any(|c| c.is_ascii_uppercase()) {
            self.rodeo.get_or_intern(name.to_ascii_lowercase())
        } else {
            self.rodeo.get_or_intern(name)
        }
    }

    /// Interns a string exactly as given, without case folding.
    ///
    /// Used for case-sensitive names such as header file names.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Resolves an [`Ident`] back to its string value.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_resolve_roundtrip() {
        let interner = Interner::new();
        let id = interner.intern_symbol("atmos_physics");
        assert_eq!(interner.resolve(id), "atmos_physics");
    }

    #[test]
    fn case_insensitive_symbols() {
        let interner = Interner::new();
        let a = interner.intern_symbol("Atmos_Physics");
        let b = interner.intern_symbol("atmos_physics");
        let c = interner.intern_symbol("ATMOS_PHYSICS");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(interner.resolve(a), "atmos_physics");
    }

    #[test]
    fn exact_interning_preserves_case() {
        let interner = Interner::new();
        let a = interner.get_or_intern("Header.h");
        let b = interner.get_or_intern("header.h");
        assert_ne!(a, b);
    }

    #[test]
    fn different_symbols_differ() {
        let interner = Interner::new();
        let a = interner.intern_symbol("foo_mod");
        let b = interner.intern_symbol("bar_mod");
        assert_ne!(a, b);
    }

    #[test]
    fn serde_roundtrip() {
        let id = Ident::from_raw(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
