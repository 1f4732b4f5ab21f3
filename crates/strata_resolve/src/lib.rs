//! Symbol resolution: joins per-file defines and requires into file-level
//! dependency edges.
//!
//! Consumes every file's [`FileFacts`] in one pass. A symbol defined by two
//! files and a required symbol no file defines are both hard errors; the
//! resolver collects all of them rather than stopping at the first. Symbols
//! on the configured external list are assumed satisfied by prebuilt
//! archives and produce no edge.

#![warn(missing_docs)]

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use strata_common::{Ident, Interner};
use strata_extract::FileFacts;

/// File-level dependencies: for each file, the set of files whose outputs
/// its compilation needs. Ordered maps keep the result deterministic for a
/// given file set.
pub type FileDeps = BTreeMap<PathBuf, BTreeSet<PathBuf>>;

/// The resolver's full output.
#[derive(Debug)]
pub struct Resolution {
    /// File-level dependency edges.
    pub deps: FileDeps,
    /// The defining file of every resolved symbol, for entry-point lookup.
    pub providers: BTreeMap<String, PathBuf>,
}

/// A resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Two files define the same named unit.
    #[error("symbol '{symbol}' is defined by both {} and {}", first.display(), second.display())]
    DuplicateDefinition {
        /// The doubly-defined symbol.
        symbol: String,
        /// The file whose definition was seen first.
        first: PathBuf,
        /// The file whose definition collides with it.
        second: PathBuf,
    },

    /// A required named unit has no defining file.
    #[error("{}: no file defines '{symbol}'", path.display())]
    Unresolved {
        /// The file with the unsatisfiable requirement.
        path: PathBuf,
        /// The symbol nothing defines.
        symbol: String,
    },
}

/// Resolves all requires against all defines.
///
/// `external_symbols` names units satisfied outside the source tree.
/// Self-dependencies (a file requiring a unit it also defines) are dropped.
/// On failure, returns every duplicate definition and unresolved requirement
/// found, in file order.
pub fn resolve(
    facts: &[FileFacts],
    interner: &Interner,
    external_symbols: &[String],
) -> Result<Resolution, Vec<ResolveError>> {
    let mut errors = Vec::new();

    let mut table: HashMap<Ident, &FileFacts> = HashMap::new();
    for fact in facts {
        for &define in &fact.defines {
            match table.get(&define) {
                Some(existing) => {
                    errors.push(ResolveError::DuplicateDefinition {
                        symbol: interner.resolve(define).to_string(),
                        first: existing.path.clone(),
                        second: fact.path.clone(),
                    });
                }
                None => {
                    table.insert(define, fact);
                }
            }
        }
    }

    let external: HashSet<Ident> = external_symbols
        .iter()
        .map(|s| interner.intern_symbol(s))
        .collect();

    let mut deps = FileDeps::new();
    for fact in facts {
        let entry = deps.entry(fact.path.clone()).or_default();
        for &require in &fact.requires {
            match table.get(&require) {
                Some(provider) if provider.path == fact.path => {}
                Some(provider) => {
                    entry.insert(provider.path.clone());
                }
                None if external.contains(&require) => {}
                None => {
                    errors.push(ResolveError::Unresolved {
                        path: fact.path.clone(),
                        symbol: interner.resolve(require).to_string(),
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        let providers = table
            .iter()
            .map(|(ident, fact)| (interner.resolve(*ident).to_string(), fact.path.clone()))
            .collect();
        Ok(Resolution { deps, providers })
    } else {
        Err(errors)
    }
}
