//! Per-file extraction results.

use std::path::PathBuf;
use strata_common::Ident;
use strata_source::{FileId, SourceKind};

/// The named units one source file defines and requires.
///
/// This is the extractor's entire output for a file; the resolver consumes
/// it into graph edges and the named units are discarded.
#[derive(Debug, Clone)]
pub struct FileFacts {
    /// The file these facts describe.
    pub file: FileId,
    /// The file's path, used for resolver output and error reporting.
    pub path: PathBuf,
    /// The file's source kind.
    pub kind: SourceKind,
    /// Named units this file defines, in source order, deduplicated.
    pub defines: Vec<Ident>,
    /// Named units this file requires, in source order, deduplicated.
    pub requires: Vec<Ident>,
}

impl FileFacts {
    /// Creates empty facts for a file.
    pub fn new(file: FileId, path: PathBuf, kind: SourceKind) -> Self {
        Self {
            file,
            path,
            kind,
            defines: Vec::new(),
            requires: Vec::new(),
        }
    }

    /// Records a defined named unit, ignoring repeats.
    pub fn add_define(&mut self, ident: Ident) {
        if !self.defines.contains(&ident) {
            self.defines.push(ident);
        }
    }

    /// Records a required named unit, ignoring repeats.
    pub fn add_require(&mut self, ident: Ident) {
        if !self.requires.contains(&ident) {
            self.requires.push(ident);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_on_insert() {
        let mut facts = FileFacts::new(
            FileId::from_raw(0),
            PathBuf::from("a.f90"),
            SourceKind::FortranFree,
        );
        let id = Ident::from_raw(7);
        facts.add_define(id);
        facts.add_define(id);
        facts.add_require(id);
        facts.add_require(id);
        assert_eq!(facts.defines.len(), 1);
        assert_eq!(facts.requires.len(), 1);
    }
}
