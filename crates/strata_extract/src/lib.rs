//! Unit extraction: turns source files into sets of defined and required
//! named units.
//!
//! Extraction is purely lexical, per [`SourceKind`]. Files are processed in
//! parallel; a failure in one file is collected as an [`ExtractionError`]
//! without aborting the others.

#![warn(missing_docs)]

mod c;
pub mod error;
pub mod facts;
mod fortran;
mod kernel;

pub use error::ExtractionError;
pub use facts::FileFacts;

use rayon::prelude::*;
use strata_common::Interner;
use strata_source::{SourceDb, SourceFile, SourceKind};

/// The result of extracting a whole file set.
#[derive(Debug)]
pub struct ExtractionOutcome {
    /// Facts for every file that extracted cleanly, in file ID order.
    pub facts: Vec<FileFacts>,
    /// Errors for the files that did not, in file ID order.
    pub errors: Vec<ExtractionError>,
}

/// Extracts named units from a single source file.
pub fn extract_file(file: &SourceFile, interner: &Interner) -> Result<FileFacts, ExtractionError> {
    let mut facts = FileFacts::new(file.id, file.path.clone(), file.kind);
    match file.kind {
        SourceKind::FortranFree | SourceKind::FortranPreprocess => {
            fortran::extract_fortran(file, interner, &mut facts)?;
        }
        SourceKind::C => c::extract_c(file, interner, &mut facts)?,
        SourceKind::CHeader | SourceKind::FortranInclude => {
            c::extract_header(file, interner, &mut facts)?;
        }
        SourceKind::KernelGen => kernel::extract_kernel(file, interner, &mut facts)?,
    }
    Ok(facts)
}

/// Extracts named units from every file in the database, in parallel.
///
/// Output ordering is deterministic (file ID order) regardless of worker
/// interleaving.
pub fn extract_all(db: &SourceDb, interner: &Interner) -> ExtractionOutcome {
    let files: Vec<&SourceFile> = db.iter().collect();
    let results: Vec<Result<FileFacts, ExtractionError>> = files
        .par_iter()
        .map(|file| extract_file(file, interner))
        .collect();

    let mut facts = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(f) => facts.push(f),
            Err(e) => errors.push(e),
        }
    }
    ExtractionOutcome { facts, errors }
}
